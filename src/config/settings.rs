// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime settings for the bridge and simulator processes.

use std::path::PathBuf;
use std::time::Duration;

use crate::forward::{DEFAULT_TIMEOUT, WebSocketForwarder};
use crate::protocol::MqttBrokerConfig;

/// Default location of the device configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "src/assets/device_config.json";
/// Default WebSocket endpoint.
pub const DEFAULT_WEBSOCKET_URL: &str = "ws://localhost:8080";
/// Default simulator topics.
pub const DEFAULT_SIMULATOR_TOPICS: [&str; 4] = ["temp1", "temp2", "temp3", "temp4"];

/// Settings for the bridge process.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use devbridge::config::BridgeSettings;
/// use devbridge::protocol::MqttBrokerConfig;
///
/// let settings = BridgeSettings::default()
///     .with_broker(MqttBrokerConfig::new("broker.local"))
///     .with_config_path("/etc/devbridge/devices.json")
///     .with_poll_interval(Duration::from_millis(500));
///
/// assert_eq!(settings.broker.host(), "broker.local");
/// assert_eq!(settings.websocket_url, "ws://localhost:8080");
/// ```
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Broker connection.
    pub broker: MqttBrokerConfig,
    /// Path of the device configuration file.
    pub config_path: PathBuf,
    /// WebSocket endpoint receiving enriched telemetry.
    pub websocket_url: String,
    /// Bound on one WebSocket exchange.
    pub websocket_timeout: Duration,
    /// Length of one main-loop iteration.
    pub poll_interval: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            broker: MqttBrokerConfig::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            websocket_url: DEFAULT_WEBSOCKET_URL.to_string(),
            websocket_timeout: DEFAULT_TIMEOUT,
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl BridgeSettings {
    /// Sets the broker connection.
    #[must_use]
    pub fn with_broker(mut self, broker: MqttBrokerConfig) -> Self {
        self.broker = broker;
        self
    }

    /// Sets the device configuration path.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Sets the WebSocket endpoint.
    #[must_use]
    pub fn with_websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = url.into();
        self
    }

    /// Sets the bound on one WebSocket exchange.
    #[must_use]
    pub fn with_websocket_timeout(mut self, timeout: Duration) -> Self {
        self.websocket_timeout = timeout;
        self
    }

    /// Sets the main-loop iteration length.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builds the WebSocket forwarder described by these settings.
    #[must_use]
    pub fn forwarder(&self) -> WebSocketForwarder {
        WebSocketForwarder::new(self.websocket_url.clone()).with_timeout(self.websocket_timeout)
    }
}

/// Settings for the telemetry simulator process.
#[derive(Debug, Clone)]
pub struct SimulatorSettings {
    /// Broker connection.
    pub broker: MqttBrokerConfig,
    /// Topics to publish to, in round-robin order.
    pub topics: Vec<String>,
    /// Pause after each publish.
    pub publish_delay: Duration,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            broker: MqttBrokerConfig::default().with_client_id_prefix("devbridge_sim"),
            topics: DEFAULT_SIMULATOR_TOPICS.iter().map(ToString::to_string).collect(),
            publish_delay: Duration::from_secs(1),
        }
    }
}

impl SimulatorSettings {
    /// Sets the broker connection.
    #[must_use]
    pub fn with_broker(mut self, broker: MqttBrokerConfig) -> Self {
        self.broker = broker;
        self
    }

    /// Sets the topics to publish to.
    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the pause after each publish.
    #[must_use]
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_defaults() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.broker.host(), "localhost");
        assert_eq!(settings.broker.port(), 1883);
        assert_eq!(settings.broker.keep_alive(), Duration::from_secs(60));
        assert_eq!(settings.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.websocket_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bridge_forwarder_uses_settings() {
        let settings = BridgeSettings::default()
            .with_websocket_url("ws://10.0.0.5:9000")
            .with_websocket_timeout(Duration::from_secs(2));
        let forwarder = settings.forwarder();

        assert_eq!(forwarder.url(), "ws://10.0.0.5:9000");
        assert_eq!(forwarder.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn simulator_defaults() {
        let settings = SimulatorSettings::default();
        assert_eq!(settings.topics, vec!["temp1", "temp2", "temp3", "temp4"]);
        assert_eq!(settings.publish_delay, Duration::from_secs(1));
    }

    #[test]
    fn simulator_custom_topics() {
        let settings = SimulatorSettings::default().with_topics(["kitchen", "garage"]);
        assert_eq!(settings.topics, vec!["kitchen", "garage"]);
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection settings.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::MqttOptions;

use crate::error::ProtocolError;

use super::ReconnectionPolicy;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default MQTT port.
pub const DEFAULT_PORT: u16 = 1883;

/// Configuration for an MQTT broker connection.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use devbridge::protocol::MqttBrokerConfig;
///
/// let config = MqttBrokerConfig::new("192.168.1.50")
///     .with_port(1884)
///     .with_credentials("user", "password")
///     .with_keep_alive(Duration::from_secs(30));
///
/// assert_eq!(config.host(), "192.168.1.50");
/// assert_eq!(config.port(), 1884);
///
/// let config = MqttBrokerConfig::from_url("mqtt://broker.local:1883").unwrap();
/// assert_eq!(config.host(), "broker.local");
/// ```
#[derive(Debug, Clone)]
pub struct MqttBrokerConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    client_id_prefix: String,
    request_capacity: usize,
    reconnection: ReconnectionPolicy,
}

impl Default for MqttBrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            credentials: None,
            keep_alive: Duration::from_secs(60),
            client_id_prefix: "devbridge".to_string(),
            request_capacity: 100,
            reconnection: ReconnectionPolicy::default(),
        }
    }
}

impl MqttBrokerConfig {
    /// Creates a configuration for the broker at `host` on the default port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration from a broker URL.
    ///
    /// Accepts `mqtt://host:port`, `tcp://host:port`, `host:port` and a bare
    /// `host` (default port).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the host is empty or the
    /// port is not a number.
    pub fn from_url(url: &str) -> Result<Self, ProtocolError> {
        let (host, port) = parse_mqtt_url(url)?;
        Ok(Self::new(host).with_port(port))
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 60 seconds).
    #[must_use]
    pub fn with_keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the prefix of the generated client ID (default: `devbridge`).
    #[must_use]
    pub fn with_client_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.client_id_prefix = prefix.into();
        self
    }

    /// Sets the capacity of the outgoing request queue (default: 100).
    #[must_use]
    pub fn with_request_capacity(mut self, capacity: usize) -> Self {
        self.request_capacity = capacity;
        self
    }

    /// Sets the reconnection policy.
    #[must_use]
    pub fn with_reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.reconnection = policy;
        self
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether authentication is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the outgoing request queue capacity.
    #[must_use]
    pub fn request_capacity(&self) -> usize {
        self.request_capacity
    }

    /// Returns the reconnection policy.
    #[must_use]
    pub fn reconnection(&self) -> &ReconnectionPolicy {
        &self.reconnection
    }

    /// Builds the `rumqttc` options for a new connection.
    ///
    /// Each call generates a fresh client ID (prefix, PID and a counter).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the host is empty.
    pub(crate) fn mqtt_options(&self) -> Result<MqttOptions, ProtocolError> {
        if self.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!(
            "{}_{}_{counter}",
            self.client_id_prefix,
            std::process::id()
        );

        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.credentials {
            options.set_credentials(username, password);
        }

        Ok(options)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), DEFAULT_PORT)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(
            "MQTT broker host is required".to_string(),
        ));
    }

    Ok((host, port))
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line parsing and process setup shared by the binaries.
//!
//! Every flag can also be set through a `DEVBRIDGE_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use crate::config::{
    BridgeSettings, DEFAULT_CONFIG_PATH, DEFAULT_SIMULATOR_TOPICS, DEFAULT_WEBSOCKET_URL,
    SimulatorSettings,
};
use crate::protocol::{DEFAULT_PORT, MqttBrokerConfig};

/// Broker connection flags.
#[derive(Debug, Clone, Args)]
pub struct BrokerArgs {
    /// MQTT broker host
    #[arg(long = "broker-host", env = "DEVBRIDGE_BROKER_HOST", default_value = "localhost")]
    pub host: String,

    /// MQTT broker port
    #[arg(long = "broker-port", env = "DEVBRIDGE_BROKER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// MQTT keep-alive interval in seconds
    #[arg(long, env = "DEVBRIDGE_KEEP_ALIVE_SECS", default_value_t = 60)]
    pub keep_alive_secs: u64,

    /// MQTT username
    #[arg(long, env = "DEVBRIDGE_MQTT_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// MQTT password
    #[arg(
        long,
        env = "DEVBRIDGE_MQTT_PASSWORD",
        requires = "username",
        hide_env_values = true
    )]
    pub password: Option<String>,
}

impl BrokerArgs {
    /// Builds the broker configuration.
    #[must_use]
    pub fn to_config(&self) -> MqttBrokerConfig {
        let config = MqttBrokerConfig::new(self.host.clone())
            .with_port(self.port)
            .with_keep_alive(Duration::from_secs(self.keep_alive_secs));

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => config.with_credentials(username, password),
            _ => config,
        }
    }
}

/// Bridges MQTT device telemetry to a WebSocket endpoint and mirrors
/// control state back to the broker.
#[derive(Debug, Parser)]
#[command(name = "devbridge", version)]
pub struct BridgeArgs {
    #[command(flatten)]
    pub broker: BrokerArgs,

    /// Device configuration file
    #[arg(long, env = "DEVBRIDGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// WebSocket endpoint receiving enriched telemetry
    #[arg(long, env = "DEVBRIDGE_WEBSOCKET_URL", default_value = DEFAULT_WEBSOCKET_URL)]
    pub websocket_url: String,

    /// Timeout for one WebSocket exchange, in milliseconds
    #[arg(long, env = "DEVBRIDGE_WEBSOCKET_TIMEOUT_MS", default_value_t = 5000)]
    pub websocket_timeout_ms: u64,

    /// Main loop interval, in milliseconds
    #[arg(long, env = "DEVBRIDGE_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,
}

impl BridgeArgs {
    /// Converts the parsed flags into bridge settings.
    #[must_use]
    pub fn into_settings(self) -> BridgeSettings {
        BridgeSettings::default()
            .with_broker(self.broker.to_config())
            .with_config_path(self.config)
            .with_websocket_url(self.websocket_url)
            .with_websocket_timeout(Duration::from_millis(self.websocket_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }
}

/// Publishes simulated sensor readings to MQTT topics.
#[derive(Debug, Parser)]
#[command(name = "devbridge-simulator", version)]
pub struct SimulatorArgs {
    #[command(flatten)]
    pub broker: BrokerArgs,

    /// Topic to publish to (repeat or comma-separate for several)
    #[arg(
        long = "topic",
        env = "DEVBRIDGE_SIM_TOPICS",
        value_delimiter = ',',
        default_values = DEFAULT_SIMULATOR_TOPICS
    )]
    pub topics: Vec<String>,

    /// Pause after each publish, in milliseconds
    #[arg(long, env = "DEVBRIDGE_SIM_DELAY_MS", default_value_t = 1000)]
    pub publish_delay_ms: u64,
}

impl SimulatorArgs {
    /// Converts the parsed flags into simulator settings.
    #[must_use]
    pub fn into_settings(self) -> SimulatorSettings {
        SimulatorSettings::default()
            .with_broker(
                self.broker
                    .to_config()
                    .with_client_id_prefix("devbridge_sim"),
            )
            .with_topics(self.topics)
            .with_publish_delay(Duration::from_millis(self.publish_delay_ms))
    }
}

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl-C.
///
/// If the signal handler cannot be installed the error is logged and the
/// future never resolves.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `devbridge` - bridges MQTT device telemetry to a WebSocket dashboard.
//!
//! The bridge subscribes to every device topic listed in a JSON device
//! configuration file, enriches each telemetry message with the device's
//! name, location and topic, and forwards it to a WebSocket endpoint. Once
//! per poll interval it re-reads the configuration and publishes each
//! device's control state (fans, lights, HVAC) to `<topic>-control`
//! whenever that state changed.
//!
//! A companion simulator publishes random sensor readings so the pipeline
//! can be exercised without hardware.
//!
//! # Quick Start
//!
//! ```no_run
//! use devbridge::bridge::Bridge;
//! use devbridge::config::BridgeSettings;
//! use devbridge::protocol::MqttBrokerConfig;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> devbridge::Result<()> {
//!     let settings = BridgeSettings::default()
//!         .with_broker(MqttBrokerConfig::from_url("mqtt://192.168.1.50:1883")?)
//!         .with_config_path("devices.json")
//!         .with_websocket_url("ws://localhost:8080");
//!
//!     Bridge::from_settings(&settings)?
//!         .run(devbridge::cli::shutdown_signal())
//!         .await
//! }
//! ```
//!
//! # Device Configuration
//!
//! ```json
//! {
//!   "devices": [
//!     { "topic": "temp1", "name": "Living Room Sensor", "location": "LR",
//!       "fansState": true, "lightsState": false, "hvacState": false }
//!   ]
//! }
//! ```

pub mod bridge;
pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod forward;
pub mod protocol;
pub mod simulator;
pub mod state;
pub mod telemetry;

pub use bridge::{Bridge, ForwardStats, TelemetryHandler};
pub use config::{BridgeSettings, ConfigLoader, Device, DeviceConfig, SimulatorSettings};
pub use control::{ControlSink, PublishReport};
pub use error::{ConfigError, DecodeError, Error, ForwardError, ProtocolError, Result};
pub use forward::{Forwarder, WebSocketForwarder};
pub use protocol::{MessageHandler, MqttBrokerConfig, MqttSession, ReconnectionPolicy};
pub use simulator::Simulator;
pub use state::{ControlState, PreviousStates};
pub use telemetry::{Reading, TelemetryFields};

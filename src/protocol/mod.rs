// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT connection handling.
//!
//! - [`MqttBrokerConfig`]: broker address, credentials, keep-alive
//! - [`MqttSession`]: one persistent connection, pumped by the caller
//! - [`MessageHandler`]: receives ConnAck-driven subscriptions and inbound
//!   publishes during a pump
//! - [`ReconnectionPolicy`]: backoff between reconnect attempts

mod broker;
mod handler;
mod reconnect;
mod session;

pub use broker::{DEFAULT_PORT, MqttBrokerConfig};
pub use handler::{IgnoreMessages, MessageHandler};
pub use reconnect::ReconnectionPolicy;
pub use session::MqttSession;

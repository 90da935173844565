// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handler interface driven by [`MqttSession::pump_for`](super::MqttSession::pump_for).

/// Receives session events while the MQTT event loop is being pumped.
///
/// Both methods run inline inside the pump, one at a time, so implementors
/// can hold plain mutable state without locking.
#[allow(async_fn_in_trait)]
pub trait MessageHandler {
    /// Returns the topics to subscribe to.
    ///
    /// Called on every ConnAck, so the subscription set is re-established
    /// after a reconnect.
    fn subscriptions(&self) -> Vec<String>;

    /// Handles one inbound publish.
    async fn on_message(&mut self, topic: &str, payload: &[u8]);
}

/// A handler that subscribes to nothing and drops every message.
///
/// Used by publish-only clients such as the telemetry simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreMessages;

impl MessageHandler for IgnoreMessages {
    fn subscriptions(&self) -> Vec<String> {
        Vec::new()
    }

    async fn on_message(&mut self, topic: &str, _payload: &[u8]) {
        tracing::trace!(topic = %topic, "Ignoring inbound message");
    }
}

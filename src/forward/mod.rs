// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delivery of enriched telemetry to downstream consumers.
//!
//! - [`WebSocketForwarder`]: one short-lived WebSocket connection per message

mod websocket;

pub use websocket::{DEFAULT_TIMEOUT, WebSocketForwarder};

use crate::error::ForwardError;
use crate::telemetry::TelemetryFields;

/// Trait for sinks that accept enriched telemetry messages.
#[allow(async_fn_in_trait)]
pub trait Forwarder {
    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError`] if the message could not be delivered. The
    /// caller drops the message; there is no retry.
    async fn forward(&self, message: &TelemetryFields) -> Result<(), ForwardError>;
}

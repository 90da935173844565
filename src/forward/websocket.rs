// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fire-and-forget WebSocket delivery.

use std::time::Duration;

use futures_util::SinkExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ForwardError;
use crate::telemetry::TelemetryFields;

use super::Forwarder;

/// Default bound on one connect/send/close exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Forwards each message over its own WebSocket connection.
///
/// Every call connects, sends one text frame with the JSON message and
/// closes. Nothing is queued or retried.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use devbridge::forward::{Forwarder, WebSocketForwarder};
/// use devbridge::telemetry::decode_payload;
///
/// # async fn example() -> Result<(), devbridge::error::ForwardError> {
/// let forwarder = WebSocketForwarder::new("ws://localhost:8080")
///     .with_timeout(Duration::from_secs(2));
///
/// let message = decode_payload(br#"{"temperature":22.5}"#).unwrap();
/// forwarder.forward(&message).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebSocketForwarder {
    url: String,
    timeout: Duration,
}

impl WebSocketForwarder {
    /// Creates a forwarder for the endpoint at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bound on one exchange (default: 5 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the exchange timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send_once(&self, text: String) -> Result<(), ForwardError> {
        let (mut ws, _) = connect_async(self.url.as_str()).await?;
        ws.send(Message::Text(text.into())).await?;
        ws.close(None).await?;
        Ok(())
    }
}

impl Forwarder for WebSocketForwarder {
    async fn forward(&self, message: &TelemetryFields) -> Result<(), ForwardError> {
        let text = serde_json::to_string(message)?;

        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.timeout.as_millis() as u64;

        tokio::time::timeout(self.timeout, self.send_once(text))
            .await
            .map_err(|_| ForwardError::Timeout(timeout_ms))??;

        tracing::debug!(url = %self.url, "Forwarded message to WebSocket");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout() {
        let forwarder = WebSocketForwarder::new("ws://localhost:8080");
        assert_eq!(forwarder.url(), "ws://localhost:8080");
        assert_eq!(forwarder.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn custom_timeout() {
        let forwarder =
            WebSocketForwarder::new("ws://localhost:8080").with_timeout(Duration::from_millis(250));
        assert_eq!(forwarder.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let forwarder = WebSocketForwarder::new("ws://127.0.0.1:1");
        let result = forwarder.forward(&TelemetryFields::new()).await;
        assert!(matches!(result, Err(ForwardError::WebSocket(_))));
    }

    #[tokio::test]
    async fn invalid_url_is_an_error() {
        let forwarder = WebSocketForwarder::new("not a url");
        assert!(forwarder.forward(&TelemetryFields::new()).await.is_err());
    }
}

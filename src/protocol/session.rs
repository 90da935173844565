// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A persistent MQTT session pumped from the caller's own loop.
//!
//! Unlike a background event-loop task, [`MqttSession`] only does network I/O
//! inside [`MqttSession::pump_for`]. Handler callbacks therefore never run
//! concurrently with the caller, which keeps the bridge single-threaded.
//!
//! # Reconnection
//!
//! `rumqttc` reconnects on the next poll after a connection error. The
//! session spaces those polls according to the broker's
//! [`ReconnectionPolicy`](super::ReconnectionPolicy) and resets the backoff
//! on every ConnAck.
//!
//! # Subscriptions
//!
//! The SUBSCRIBE for a new connection shares the request queue with
//! publishes queued while offline. When the queue is still full at ConnAck
//! the subscription stays pending and is retried on every pump step until
//! the event loop has drained enough requests to accept it.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, Outgoing, Packet, QoS, SubscribeFilter};
use tokio::time::Instant;

use crate::control::ControlSink;
use crate::error::ProtocolError;

use super::{MessageHandler, MqttBrokerConfig};

/// Upper bound on flushing the DISCONNECT packet during shutdown.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// A persistent connection to an MQTT broker.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use devbridge::protocol::{IgnoreMessages, MqttBrokerConfig, MqttSession};
///
/// # async fn example() -> Result<(), devbridge::error::ProtocolError> {
/// let mut session = MqttSession::new(MqttBrokerConfig::new("localhost"))?;
///
/// session.publish("temp1", r#"{"temperature":22.5}"#.to_string())?;
/// session.pump_for(Duration::from_secs(1), &mut IgnoreMessages).await?;
///
/// session.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct MqttSession {
    client: AsyncClient,
    event_loop: EventLoop,
    config: MqttBrokerConfig,
    connected: bool,
    failures: u32,
    retry_at: Option<Instant>,
    pending_subscriptions: Vec<String>,
}

impl MqttSession {
    /// Creates a session for the configured broker.
    ///
    /// No network I/O happens until the session is pumped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the broker host is empty.
    pub fn new(config: MqttBrokerConfig) -> Result<Self, ProtocolError> {
        let options = config.mqtt_options()?;
        let (client, event_loop) = AsyncClient::new(options, config.request_capacity());

        Ok(Self {
            client,
            event_loop,
            config,
            connected: false,
            failures: 0,
            retry_at: None,
            pending_subscriptions: Vec::new(),
        })
    }

    /// Returns the broker configuration.
    #[must_use]
    pub fn config(&self) -> &MqttBrokerConfig {
        &self.config
    }

    /// Returns whether a ConnAck has been received since the last error.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns true while the subscription for the current connection is
    /// waiting for room in the request queue.
    #[must_use]
    pub fn has_pending_subscriptions(&self) -> bool {
        !self.pending_subscriptions.is_empty()
    }

    /// Returns the number of connection errors since the last ConnAck.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Queues a publish without waiting for queue space.
    ///
    /// The message is sent the next time the session is pumped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the request queue is full.
    pub fn publish(&self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT message");
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(ProtocolError::Mqtt)
    }

    /// Queues one SUBSCRIBE request covering every topic in `topics`.
    ///
    /// Returns the number of topics requested.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the request queue is full.
    pub fn subscribe_all(&self, topics: &[String]) -> Result<usize, ProtocolError> {
        if topics.is_empty() {
            return Ok(0);
        }

        let filters = topics
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtMostOnce));
        self.client
            .try_subscribe_many(filters)
            .map_err(ProtocolError::Mqtt)?;

        tracing::debug!(topics = ?topics, "Subscribing to device topics");
        Ok(topics.len())
    }

    /// Drives network I/O for `window`, dispatching events to `handler`.
    ///
    /// Returns once the window has elapsed. A handler call that is already
    /// running when the window ends is allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionFailed`] when the reconnection
    /// policy gives up.
    pub async fn pump_for<H: MessageHandler>(
        &mut self,
        window: Duration,
        handler: &mut H,
    ) -> Result<(), ProtocolError> {
        let deadline = Instant::now() + window;

        loop {
            if let Some(retry_at) = self.retry_at {
                if retry_at >= deadline {
                    tokio::time::sleep_until(deadline).await;
                    return Ok(());
                }
                tokio::time::sleep_until(retry_at).await;
                self.retry_at = None;
            }

            self.flush_subscriptions();

            match tokio::time::timeout_at(deadline, self.event_loop.poll()).await {
                Err(_) => return Ok(()),
                Ok(Ok(event)) => self.handle_event(event, handler).await,
                Ok(Err(e)) => self.handle_connection_error(&e)?,
            }
        }
    }

    async fn handle_event<H: MessageHandler>(&mut self, event: Event, handler: &mut H) {
        match event {
            Event::Incoming(Packet::ConnAck(connack)) => {
                tracing::info!(
                    host = %self.config.host(),
                    port = %self.config.port(),
                    session_present = connack.session_present,
                    "Connected to MQTT broker"
                );
                self.connected = true;
                self.failures = 0;

                self.pending_subscriptions = handler
                    .subscriptions()
                    .into_iter()
                    .filter(|topic| {
                        let valid = rumqttc::valid_filter(topic);
                        if !valid {
                            tracing::warn!(topic = %topic, "Skipping invalid topic filter");
                        }
                        valid
                    })
                    .collect();
                self.flush_subscriptions();
                if self.has_pending_subscriptions() {
                    tracing::warn!(
                        topics = self.pending_subscriptions.len(),
                        "Request queue full, subscription deferred"
                    );
                }
            }
            Event::Incoming(Packet::SubAck(suback)) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Event::Incoming(Packet::Publish(publish)) => {
                tracing::debug!(
                    topic = %publish.topic,
                    bytes = publish.payload.len(),
                    "MQTT message received"
                );
                handler.on_message(&publish.topic, &publish.payload).await;
            }
            Event::Incoming(Packet::Disconnect) => {
                tracing::info!("MQTT broker closed the session");
                self.connected = false;
            }
            _ => {}
        }
    }

    /// Queues the pending SUBSCRIBE if connected and the queue has room.
    fn flush_subscriptions(&mut self) {
        if !self.connected || self.pending_subscriptions.is_empty() {
            return;
        }

        // Filters were validated at ConnAck, so a rejection means a full queue.
        if self.subscribe_all(&self.pending_subscriptions).is_ok() {
            self.pending_subscriptions.clear();
        }
    }

    fn handle_connection_error(&mut self, error: &ConnectionError) -> Result<(), ProtocolError> {
        if self.connected {
            tracing::warn!(error = %error, "MQTT connection lost");
            self.connected = false;
        }
        // Re-requested from the handler on the next ConnAck.
        self.pending_subscriptions.clear();

        let policy = self.config.reconnection();
        let attempt = self.failures;
        self.failures = self.failures.saturating_add(1);

        if !policy.should_retry(attempt) {
            tracing::error!(error = %error, failures = self.failures, "Giving up on MQTT broker");
            return Err(ProtocolError::ConnectionFailed(format!(
                "{error} (after {} attempts)",
                self.failures
            )));
        }

        let delay = policy.delay_for_attempt(attempt);
        #[allow(clippy::cast_possible_truncation)]
        let retry_in_ms = delay.as_millis() as u64;
        tracing::warn!(
            error = %error,
            attempt = self.failures,
            retry_in_ms,
            "MQTT connection error, will retry"
        );
        self.retry_at = Some(Instant::now() + delay);
        Ok(())
    }

    /// Disconnects from the broker, flushing the DISCONNECT packet.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the disconnect request cannot be
    /// queued.
    pub async fn disconnect(mut self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.config.host(),
            port = %self.config.port(),
            "Disconnecting from MQTT broker"
        );

        if !self.connected {
            return Ok(());
        }

        self.client.try_disconnect().map_err(ProtocolError::Mqtt)?;

        let event_loop = &mut self.event_loop;
        let flush = async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        };

        if tokio::time::timeout(DISCONNECT_TIMEOUT, flush).await.is_err() {
            tracing::warn!("Timed out flushing MQTT disconnect");
        }
        Ok(())
    }
}

impl ControlSink for MqttSession {
    fn publish_control(&mut self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        self.publish(topic, payload)
    }
}

impl std::fmt::Debug for MqttSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSession")
            .field("host", &self.config.host())
            .field("port", &self.config.port())
            .field("connected", &self.connected)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

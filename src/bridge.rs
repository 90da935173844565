// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MQTT to WebSocket bridge.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────── every poll_interval ────────────┐
//!              ↓                                             │
//!   ConfigLoader.try_load() ──► snapshot ──► publish_control_states()
//!                                  │                         │
//!                                  ↓                         ↓
//!                        TelemetryHandler           <topic>-control
//!                                  ↑
//!   MqttSession.pump_for() ── ConnAck → subscribe(snapshot.topics())
//!                         └── Publish → decode → enrich → Forwarder
//! ```
//!
//! Everything runs on the caller's task. Handlers execute inside the pump,
//! one message at a time, so the snapshot and the previous-state memory are
//! plain owned values.

use std::future::Future;
use std::time::Duration;

use crate::config::{BridgeSettings, ConfigLoader, DeviceConfig};
use crate::control::{PublishReport, publish_control_states};
use crate::error::{ProtocolError, Result};
use crate::forward::{Forwarder, WebSocketForwarder};
use crate::protocol::{MessageHandler, MqttSession};
use crate::state::PreviousStates;
use crate::telemetry::{decode_payload, enrich};

/// Counters kept by [`TelemetryHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    /// Messages delivered to the forwarder.
    pub forwarded: u64,
    /// Messages dropped because the payload could not be decoded.
    pub decode_failures: u64,
    /// Messages dropped because the forwarder failed.
    pub forward_failures: u64,
}

/// Enriches inbound telemetry and hands it to a [`Forwarder`].
///
/// Holds the configuration snapshot used both for the subscription set and
/// for metadata lookups.
#[derive(Debug)]
pub struct TelemetryHandler<F> {
    snapshot: DeviceConfig,
    forwarder: F,
    stats: ForwardStats,
}

impl<F> TelemetryHandler<F> {
    /// Creates a handler with an initial configuration snapshot.
    pub fn new(snapshot: DeviceConfig, forwarder: F) -> Self {
        Self {
            snapshot,
            forwarder,
            stats: ForwardStats::default(),
        }
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &DeviceConfig {
        &self.snapshot
    }

    /// Replaces the configuration snapshot.
    ///
    /// Takes effect for the next message. The subscription set only changes
    /// on the next (re)connect.
    pub fn replace_snapshot(&mut self, snapshot: DeviceConfig) {
        self.snapshot = snapshot;
    }

    /// Returns the forwarder.
    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Returns the message counters.
    #[must_use]
    pub fn stats(&self) -> ForwardStats {
        self.stats
    }
}

impl<F: Forwarder> MessageHandler for TelemetryHandler<F> {
    fn subscriptions(&self) -> Vec<String> {
        self.snapshot
            .topics()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    async fn on_message(&mut self, topic: &str, payload: &[u8]) {
        let fields = match decode_payload(payload) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Dropping undecodable message");
                self.stats.decode_failures += 1;
                return;
            }
        };

        let message = enrich(fields, topic, &self.snapshot);

        match self.forwarder.forward(&message).await {
            Ok(()) => self.stats.forwarded += 1,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Failed to forward message");
                self.stats.forward_failures += 1;
            }
        }
    }
}

/// The bridge process: config polling, control mirroring and telemetry
/// forwarding over one MQTT session.
///
/// # Examples
///
/// ```no_run
/// use devbridge::bridge::Bridge;
/// use devbridge::config::BridgeSettings;
///
/// # async fn example() -> devbridge::Result<()> {
/// let bridge = Bridge::from_settings(&BridgeSettings::default())?;
/// bridge.run(async {
///     let _ = tokio::signal::ctrl_c().await;
/// }).await
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge<F = WebSocketForwarder> {
    session: MqttSession,
    loader: ConfigLoader,
    handler: TelemetryHandler<F>,
    previous: PreviousStates,
    poll_interval: Duration,
}

impl Bridge<WebSocketForwarder> {
    /// Creates a bridge forwarding to the WebSocket endpoint in `settings`.
    ///
    /// # Errors
    ///
    /// See [`Bridge::with_forwarder`].
    pub fn from_settings(settings: &BridgeSettings) -> Result<Self> {
        Self::with_forwarder(settings, settings.forwarder())
    }
}

impl<F: Forwarder> Bridge<F> {
    /// Creates a bridge with a custom forwarder.
    ///
    /// The device configuration must load at startup; later load failures
    /// only skip the affected iteration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// cannot be loaded and [`Error::Protocol`](crate::Error::Protocol) if
    /// the broker address is invalid.
    pub fn with_forwarder(settings: &BridgeSettings, forwarder: F) -> Result<Self> {
        let loader = ConfigLoader::new(&settings.config_path);
        let initial = loader.try_load()?;
        let session = MqttSession::new(settings.broker.clone())?;

        tracing::info!(
            path = %loader.path().display(),
            devices = initial.len(),
            "Loaded device config"
        );

        Ok(Self {
            session,
            loader,
            handler: TelemetryHandler::new(initial, forwarder),
            previous: PreviousStates::new(),
            poll_interval: settings.poll_interval,
        })
    }

    /// Returns the telemetry handler.
    pub fn handler(&self) -> &TelemetryHandler<F> {
        &self.handler
    }

    /// Returns the control states published so far.
    pub fn previous_states(&self) -> &PreviousStates {
        &self.previous
    }

    /// Returns the MQTT session.
    pub fn session(&self) -> &MqttSession {
        &self.session
    }

    /// Reloads the configuration and publishes changed control states.
    ///
    /// Returns `None` when the configuration could not be loaded; the
    /// previous snapshot stays in place and nothing is published.
    pub fn refresh(&mut self) -> Option<PublishReport> {
        let config = match self.loader.try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Device config unavailable, skipping iteration");
                return None;
            }
        };

        self.handler.replace_snapshot(config);
        let report =
            publish_control_states(self.handler.snapshot(), &mut self.previous, &mut self.session);

        if report.published > 0 || report.failed > 0 {
            tracing::debug!(
                published = report.published,
                failed = report.failed,
                "Control states refreshed"
            );
        }
        Some(report)
    }

    /// Runs one iteration: refresh, then pump the session for the poll
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns error if the reconnection policy gave up on the broker.
    pub async fn tick(&mut self) -> std::result::Result<(), ProtocolError> {
        self.refresh();
        self.session
            .pump_for(self.poll_interval, &mut self.handler)
            .await
    }

    /// Runs until `shutdown` resolves, then disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the reconnection policy gave up on the broker or
    /// the disconnect could not be queued.
    pub async fn run<S>(mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            host = %self.session.config().host(),
            port = %self.session.config().port(),
            "Bridge running"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                result = self.tick() => result?,
            }
        }

        let stats = self.handler.stats();
        tracing::info!(
            forwarded = stats.forwarded,
            decode_failures = stats.decode_failures,
            forward_failures = stats.forward_failures,
            "Bridge stopped"
        );

        self.session.disconnect().await?;
        Ok(())
    }
}

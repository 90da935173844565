// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry simulator standing in for real sensor devices.
//!
//! Publishes one random [`Reading`] per topic, pausing between publishes,
//! round-robin over the configured topics until interrupted.

use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulatorSettings;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::{IgnoreMessages, MqttSession};
use crate::telemetry::Reading;

/// Publishes synthetic readings to a fixed set of topics.
///
/// # Examples
///
/// ```no_run
/// use devbridge::config::SimulatorSettings;
/// use devbridge::simulator::Simulator;
///
/// # async fn example() -> devbridge::Result<()> {
/// let simulator = Simulator::from_settings(&SimulatorSettings::default())?;
/// simulator.run(async {
///     let _ = tokio::signal::ctrl_c().await;
/// }).await
/// # }
/// ```
#[derive(Debug)]
pub struct Simulator<R = StdRng> {
    session: MqttSession,
    topics: Vec<String>,
    publish_delay: Duration,
    rng: R,
    published: u64,
}

impl Simulator<StdRng> {
    /// Creates a simulator seeded from system entropy.
    ///
    /// # Errors
    ///
    /// See [`Simulator::with_rng`].
    pub fn from_settings(settings: &SimulatorSettings) -> Result<Self> {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulator<R> {
    /// Creates a simulator drawing readings from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if no topics are configured and
    /// [`Error::Protocol`] if the broker address is invalid.
    pub fn with_rng(settings: &SimulatorSettings, rng: R) -> Result<Self> {
        if settings.topics.is_empty() {
            return Err(Error::InvalidSettings(
                "simulator needs at least one topic".to_string(),
            ));
        }

        let session = MqttSession::new(settings.broker.clone())?;

        Ok(Self {
            session,
            topics: settings.topics.clone(),
            publish_delay: settings.publish_delay,
            rng,
            published: 0,
        })
    }

    /// Returns the topics published to.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Returns the number of readings queued so far.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Draws a reading and queues it for `topic`.
    ///
    /// # Errors
    ///
    /// Returns error if the publish cannot be queued.
    pub fn publish_reading(&mut self, topic: &str) -> std::result::Result<Reading, ProtocolError> {
        let reading = Reading::random(&mut self.rng);
        self.session.publish(topic, reading.to_payload()?)?;
        self.published += 1;
        Ok(reading)
    }

    /// Returns the MQTT session.
    pub fn session(&self) -> &MqttSession {
        &self.session
    }

    /// Services the MQTT session for `window`, sending queued readings.
    ///
    /// # Errors
    ///
    /// Returns error if the reconnection policy gave up on the broker.
    pub async fn flush(&mut self, window: Duration) -> std::result::Result<(), ProtocolError> {
        self.session.pump_for(window, &mut IgnoreMessages).await
    }

    /// Publishes one reading to every topic, pausing after each.
    ///
    /// # Errors
    ///
    /// Returns error if the reconnection policy gave up on the broker.
    pub async fn cycle(&mut self) -> std::result::Result<(), ProtocolError> {
        for index in 0..self.topics.len() {
            let topic = self.topics[index].clone();
            match self.publish_reading(&topic) {
                Ok(reading) => tracing::info!(
                    topic = %topic,
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    co2 = reading.co2,
                    "Sent reading"
                ),
                Err(e) => tracing::warn!(topic = %topic, error = %e, "Failed to publish reading"),
            }

            self.flush(self.publish_delay).await?;
        }
        Ok(())
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
            topics = ?self.topics,
            "Simulation started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Simulation stopped");
                    break;
                }
                result = self.cycle() => result?,
            }
        }

        tracing::info!(published = self.published, "Disconnecting simulator");
        self.session.disconnect().await?;
        Ok(())
    }
}

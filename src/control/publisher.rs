// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diff-only control state publishing.

use crate::config::DeviceConfig;
use crate::error::ProtocolError;
use crate::state::PreviousStates;

/// Suffix appended to a device topic to form its control topic.
const CONTROL_SUFFIX: &str = "-control";

/// Destination for control state payloads.
///
/// Implemented by [`MqttSession`](crate::protocol::MqttSession); tests use an
/// in-memory recorder.
pub trait ControlSink {
    /// Publishes `payload` to `topic`.
    ///
    /// # Errors
    ///
    /// Returns error if the publish cannot be queued.
    fn publish_control(&mut self, topic: &str, payload: String) -> Result<(), ProtocolError>;
}

/// Outcome of one publishing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Devices whose new state was published.
    pub published: usize,
    /// Devices whose state matched the last published one.
    pub unchanged: usize,
    /// Devices whose publish failed; they are retried next pass.
    pub failed: usize,
}

/// Returns the control topic for a device topic.
///
/// ```
/// assert_eq!(devbridge::control::control_topic("temp1"), "temp1-control");
/// ```
#[must_use]
pub fn control_topic(topic: &str) -> String {
    format!("{topic}{CONTROL_SUFFIX}")
}

/// Publishes the control state of every device whose state changed.
///
/// A device's state is recorded in `previous` only after its publish was
/// accepted, so a failed device is retried on the next pass. Failures are
/// logged and never stop the remaining devices from being processed.
pub fn publish_control_states<S: ControlSink + ?Sized>(
    config: &DeviceConfig,
    previous: &mut PreviousStates,
    sink: &mut S,
) -> PublishReport {
    let mut report = PublishReport::default();

    for (topic, state) in config.control_states() {
        if !previous.has_changed(topic, &state) {
            report.unchanged += 1;
            continue;
        }

        let control_topic = control_topic(topic);
        let result = state
            .to_payload()
            .map_err(ProtocolError::Encode)
            .and_then(|payload| sink.publish_control(&control_topic, payload));

        match result {
            Ok(()) => {
                tracing::info!(
                    topic = %control_topic,
                    fans = state.fans_state,
                    lights = state.lights_state,
                    hvac = state.hvac_state,
                    "Published control state"
                );
                previous.record(topic, state);
                report.published += 1;
            }
            Err(e) => {
                tracing::error!(topic = %control_topic, error = %e, "Failed to publish control state");
                report.failed += 1;
            }
        }
    }

    report
}

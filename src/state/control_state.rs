// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Desired actuator state for one device.

use serde::{Deserialize, Serialize};

/// The fan/light/HVAC flags of a device at one point in time.
///
/// Serializes to the control topic payload, with keys in this order:
///
/// ```
/// use devbridge::state::ControlState;
///
/// let state = ControlState::new(true, false, false);
/// assert_eq!(
///     serde_json::to_string(&state).unwrap(),
///     r#"{"fansState":true,"lightsState":false,"hvacState":false}"#
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct ControlState {
    /// Whether the fans should run.
    pub fans_state: bool,
    /// Whether the lights should be on.
    pub lights_state: bool,
    /// Whether the HVAC should run.
    pub hvac_state: bool,
}

impl ControlState {
    /// Creates a control state from its three flags.
    #[must_use]
    pub fn new(fans: bool, lights: bool, hvac: bool) -> Self {
        Self {
            fans_state: fans,
            lights_state: lights,
            hvac_state: hvac,
        }
    }

    /// Encodes the state as the JSON payload published to the control topic.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_off() {
        assert_eq!(ControlState::default(), ControlState::new(false, false, false));
    }

    #[test]
    fn equality_is_field_wise() {
        assert_eq!(ControlState::new(true, false, true), ControlState::new(true, false, true));
        assert_ne!(ControlState::new(true, false, true), ControlState::new(true, true, true));
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let payload = ControlState::new(false, true, true).to_payload().unwrap();
        assert_eq!(
            payload,
            r#"{"fansState":false,"lightsState":true,"hvacState":true}"#
        );
    }

    #[test]
    fn payload_parses_back() {
        let parsed: ControlState =
            serde_json::from_str(r#"{"fansState":true,"lightsState":true,"hvacState":false}"#)
                .unwrap();
        assert_eq!(parsed, ControlState::new(true, true, false));
    }
}

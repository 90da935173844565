// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration document.

use serde::{Deserialize, Deserializer, Serialize};

use crate::state::ControlState;

/// Placeholder used when a device has no name or location, or when a topic
/// matches no configured device.
pub const UNKNOWN: &str = "Unknown";

/// The device configuration file contents.
///
/// The on-disk format is a top-level object with a `devices` array:
///
/// ```
/// use devbridge::config::DeviceConfig;
///
/// let config: DeviceConfig = serde_json::from_str(r#"{
///     "devices": [
///         { "topic": "temp1", "name": "Living Room Sensor", "location": "LR", "fansState": true }
///     ]
/// }"#).unwrap();
///
/// let device = config.find("temp1").unwrap();
/// assert_eq!(device.display_name(), "Living Room Sensor");
/// assert!(device.control_state().fans_state);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Configured devices, in file order.
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl DeviceConfig {
    /// Creates a configuration from a list of devices.
    #[must_use]
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Returns true if no devices are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns the number of configured devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Finds the first device whose topic is `topic`.
    #[must_use]
    pub fn find(&self, topic: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.topic() == Some(topic))
    }

    /// Returns every distinct device topic, in file order.
    ///
    /// Devices without a topic are skipped and duplicate topics appear once.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::with_capacity(self.devices.len());
        for topic in self.devices.iter().filter_map(Device::topic) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }

    /// Iterates over `(topic, control state)` for every device with a topic.
    pub fn control_states(&self) -> impl Iterator<Item = (&str, ControlState)> {
        self.devices
            .iter()
            .filter_map(|d| d.topic().map(|topic| (topic, d.control_state())))
    }
}

/// A single device entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Device {
    /// MQTT topic carrying the device's telemetry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Desired fan state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fans_state: bool,
    /// Desired light state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lights_state: bool,
    /// Desired HVAC state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hvac_state: bool,
}

impl Device {
    /// Creates a device bound to `topic` with no metadata and all flags off.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the display location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the three control flags.
    #[must_use]
    pub fn with_control(mut self, state: ControlState) -> Self {
        self.fans_state = state.fans_state;
        self.lights_state = state.lights_state;
        self.hvac_state = state.hvac_state;
        self
    }

    /// Returns the topic, treating an empty string as absent.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the name, or [`UNKNOWN`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }

    /// Returns the location, or [`UNKNOWN`].
    #[must_use]
    pub fn display_location(&self) -> &str {
        self.location.as_deref().unwrap_or(UNKNOWN)
    }

    /// Returns the desired control state.
    #[must_use]
    pub fn control_state(&self) -> ControlState {
        ControlState::new(self.fans_state, self.lights_state, self.hvac_state)
    }
}

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

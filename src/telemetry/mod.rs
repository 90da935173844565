// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry payloads.
//!
//! Device telemetry is a flat JSON object published on the device topic.
//! The bridge decodes it, adds the device's metadata and forwards the
//! result:
//!
//! ```text
//! temp1: {"temperature":22.5}
//!            ↓ enrich (device_config.json)
//! {"temperature":22.5,"device_name":"Living Room Sensor","location":"LR","topic":"temp1"}
//! ```
//!
//! # Examples
//!
//! ```
//! use devbridge::config::{Device, DeviceConfig};
//! use devbridge::telemetry::{decode_payload, enrich};
//!
//! let config = DeviceConfig::new(vec![
//!     Device::new("temp1").with_name("Living Room Sensor").with_location("LR"),
//! ]);
//!
//! let fields = decode_payload(br#"{"temperature":22.5}"#).unwrap();
//! let enriched = enrich(fields, "temp1", &config);
//!
//! assert_eq!(enriched["device_name"], "Living Room Sensor");
//! assert_eq!(enriched["topic"], "temp1");
//! ```

mod enrich;
mod reading;

pub use enrich::{
    DEVICE_NAME_KEY, LOCATION_KEY, TOPIC_KEY, TelemetryFields, decode_payload, enrich,
};
pub use reading::Reading;

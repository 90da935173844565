// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding and metadata enrichment of telemetry payloads.

use serde_json::{Map, Value};

use crate::config::{DeviceConfig, UNKNOWN};
use crate::error::DecodeError;

/// Key carrying the device name in an enriched message.
pub const DEVICE_NAME_KEY: &str = "device_name";
/// Key carrying the device location in an enriched message.
pub const LOCATION_KEY: &str = "location";
/// Key carrying the originating topic in an enriched message.
pub const TOPIC_KEY: &str = "topic";

/// The fields of a telemetry JSON object, in payload order.
pub type TelemetryFields = Map<String, Value>;

/// Decodes a raw MQTT payload into telemetry fields.
///
/// # Errors
///
/// Returns [`DecodeError`] if the payload is not UTF-8, not JSON, or not a
/// JSON object.
pub fn decode_payload(payload: &[u8]) -> Result<TelemetryFields, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => Ok(fields),
        other => Err(DecodeError::NotAnObject(json_kind(&other))),
    }
}

/// Adds `device_name`, `location` and `topic` to `fields`.
///
/// Metadata comes from the first device configured for `topic`; when none
/// matches, name and location are [`UNKNOWN`]. The three keys overwrite
/// same-named payload fields in place and are appended otherwise.
#[must_use]
pub fn enrich(mut fields: TelemetryFields, topic: &str, config: &DeviceConfig) -> TelemetryFields {
    let (name, location) = config.find(topic).map_or((UNKNOWN, UNKNOWN), |device| {
        (device.display_name(), device.display_location())
    });

    fields.insert(DEVICE_NAME_KEY.to_string(), Value::from(name));
    fields.insert(LOCATION_KEY.to_string(), Value::from(location));
    fields.insert(TOPIC_KEY.to_string(), Value::from(topic));
    fields
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Every failure on the message path is local: the bridge logs it and moves
//! on to the next message, device, or iteration. These types exist so that
//! the reason can be logged with structure and inspected in tests.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The device configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred while talking to the MQTT broker.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An inbound telemetry payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An enriched message could not be forwarded.
    #[error("forward error: {0}")]
    Forward(#[from] ForwardError),

    /// Process settings are unusable.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Errors raised while reading the device configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file {} not found", .0.display())]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path of the file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file holds an empty top-level object.
    #[error("config file {} is empty", .0.display())]
    Empty(PathBuf),

    /// The configuration file is not a valid device document.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Path of the file being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to MQTT communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request (queue full or event loop gone).
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed and the reconnection policy gave up.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A payload could not be serialized for publishing.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors decoding an inbound telemetry payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid UTF-8.
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload is not valid JSON.
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but not an object, so it cannot be enriched.
    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Errors forwarding a message to the WebSocket endpoint.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// WebSocket connect, send, or close failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The exchange did not complete in time.
    #[error("WebSocket exchange timed out after {0} ms")]
    Timeout(u64),

    /// The message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

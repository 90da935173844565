// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration.
//!
//! - [`DeviceConfig`] / [`Device`]: the device document, reloaded from disk
//!   by [`ConfigLoader`] on every polling iteration
//! - [`BridgeSettings`] / [`SimulatorSettings`]: process settings, fixed at
//!   startup

mod device;
mod loader;
mod settings;

pub use device::{Device, DeviceConfig, UNKNOWN};
pub use loader::ConfigLoader;
pub use settings::{
    BridgeSettings, DEFAULT_CONFIG_PATH, DEFAULT_SIMULATOR_TOPICS, DEFAULT_WEBSOCKET_URL,
    SimulatorSettings,
};

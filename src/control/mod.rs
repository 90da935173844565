// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirrors device control state onto the broker.
//!
//! Each polling iteration, every configured device's fan/light/HVAC flags
//! are compared with what was last published for its topic. Only changes are
//! published, to `<topic>-control`.
//!
//! ```text
//! device_config.json ─► ControlState ─► PreviousStates differs? ─► <topic>-control
//! ```

mod publisher;

pub use publisher::{ControlSink, PublishReport, control_topic, publish_control_states};

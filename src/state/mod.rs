// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control state tracking.
//!
//! [`ControlState`] is the fan/light/HVAC triple derived from a device entry.
//! [`PreviousStates`] remembers what was last published per topic so the
//! control publisher only emits changes.

mod control_state;
mod previous_states;

pub use control_state::ControlState;
pub use previous_states::PreviousStates;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last published control state per topic.

use std::collections::HashMap;

use super::ControlState;

/// Memory of the control state last published for each device topic.
///
/// Entries are never evicted and nothing is persisted, so the first
/// iteration after a restart republishes every device.
///
/// # Examples
///
/// ```
/// use devbridge::state::{ControlState, PreviousStates};
///
/// let mut previous = PreviousStates::new();
/// let on = ControlState::new(true, false, false);
///
/// assert!(previous.has_changed("temp1", &on));
/// previous.record("temp1", on);
/// assert!(!previous.has_changed("temp1", &on));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PreviousStates {
    states: HashMap<String, ControlState>,
}

impl PreviousStates {
    /// Creates an empty state memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `state` differs from the last recorded state for
    /// `topic`, or if nothing was recorded yet.
    #[must_use]
    pub fn has_changed(&self, topic: &str, state: &ControlState) -> bool {
        self.states.get(topic) != Some(state)
    }

    /// Records `state` as the last published state for `topic`.
    pub fn record(&mut self, topic: impl Into<String>, state: ControlState) {
        self.states.insert(topic.into(), state);
    }

    /// Returns the last recorded state for `topic`.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&ControlState> {
        self.states.get(topic)
    }

    /// Returns the number of tracked topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no topic has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

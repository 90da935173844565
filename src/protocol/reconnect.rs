// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spacing of reconnect attempts after broker errors.

use std::time::Duration;

/// How long [`MqttSession`](super::MqttSession) waits between reconnect
/// attempts, and when it gives up.
///
/// The n-th consecutive failure waits `initial_delay * backoff_multiplier^n`,
/// capped at `max_delay`. The count resets on every ConnAck.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use devbridge::protocol::ReconnectionPolicy;
///
/// // The bridge never gives up on its broker.
/// let policy = ReconnectionPolicy::default();
/// assert!(policy.should_retry(1_000));
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
///
/// let policy = ReconnectionPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(10));
/// assert!(!policy.should_retry(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectionPolicy {
    /// False turns the first connection error into a session failure.
    pub enabled: bool,
    /// Consecutive failures after which the session fails, or `None` to
    /// keep retrying.
    pub max_retries: Option<u32>,
    /// Wait after the first failure.
    pub initial_delay: Duration,
    /// Cap on any single wait.
    pub max_delay: Duration,
    /// Growth factor between consecutive waits.
    pub backoff_multiplier: f32,
}

impl ReconnectionPolicy {
    /// Returns the default policy: 1 s doubling up to 30 s, forever.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a policy that fails the session on the first error.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Gives up after `max_retries` consecutive failures.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Wait after failure number `attempt`, counting from 0.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let factor = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f32 * factor;

        // f32 -> u64 saturates, so an overflowing power lands on max_delay
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }

    /// Whether to try again after `failures` consecutive failures.
    #[must_use]
    pub fn should_retry(&self, failures: u32) -> bool {
        self.enabled && self.max_retries.is_none_or(|max| failures < max)
    }
}

impl Default for ReconnectionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: None,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

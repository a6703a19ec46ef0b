// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconnection timing.

use std::time::Duration;

use crate::types::DeviceClass;

/// Timing rules for reconnecting after the controller drops its link.
///
/// The first attempt after a loss waits [`local_delay`](Self::local_delay)
/// for LAN devices, or a whole number of seconds drawn uniformly from
/// `[cloud_min_delay, cloud_max_delay)` for cloud devices so that many
/// installations do not hit the vendor cloud at the same instant. Each failed
/// attempt `n` (counting from 0) then waits `2^n` seconds, capped at
/// [`max_backoff`](Self::max_backoff).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use intesis_lib::manager::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::default();
/// assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
/// assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
/// assert_eq!(policy.backoff_delay(40), Duration::from_secs(300));
///
/// let quick = ReconnectPolicy::new()
///     .with_local_delay(Duration::from_secs(5))
///     .with_max_backoff(Duration::from_secs(60));
/// assert_eq!(quick.backoff_delay(10), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first attempt for local devices.
    pub local_delay: Duration,
    /// Inclusive lower bound of the first-attempt window for cloud devices.
    pub cloud_min_delay: Duration,
    /// Exclusive upper bound of the first-attempt window for cloud devices.
    pub cloud_max_delay: Duration,
    /// Ceiling for the exponential backoff between failed attempts.
    pub max_backoff: Duration,
}

impl ReconnectPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first-attempt delay for local devices.
    #[must_use]
    pub fn with_local_delay(mut self, delay: Duration) -> Self {
        self.local_delay = delay;
        self
    }

    /// Sets the first-attempt window for cloud devices.
    ///
    /// Only whole seconds are drawn. A window whose upper bound is not past
    /// its lower bound always yields the lower bound.
    #[must_use]
    pub fn with_cloud_delay(mut self, min: Duration, max: Duration) -> Self {
        self.cloud_min_delay = min;
        self.cloud_max_delay = max;
        self
    }

    /// Sets the backoff ceiling.
    #[must_use]
    pub fn with_max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = delay;
        self
    }

    /// Returns the delay before the first reconnect attempt.
    #[must_use]
    pub fn initial_delay(&self, class: DeviceClass) -> Duration {
        match class {
            DeviceClass::Local => self.local_delay,
            DeviceClass::Cloud => {
                let min = self.cloud_min_delay.as_secs();
                let max = self.cloud_max_delay.as_secs();
                if max <= min {
                    return Duration::from_secs(min);
                }
                Duration::from_secs(rand::random_range(min..max))
            }
        }
    }

    /// Returns the delay after failed attempt `retry` (0-based).
    #[must_use]
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let secs = 1_u64.checked_shl(retry).unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.max_backoff)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            local_delay: Duration::from_secs(30),
            cloud_min_delay: Duration::from_secs(10),
            cloud_max_delay: Duration::from_secs(30),
            max_backoff: Duration::from_secs(300),
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable connection state of a supervisor.

use std::time::Duration;

/// Where a supervisor stands in its connect/reconnect cycle.
///
/// Published on a watch channel by
/// [`ConnectionSupervisor::watch_link_state`](super::ConnectionSupervisor::watch_link_state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected yet, or connected state has not been established.
    Disconnected,
    /// The supervisor believes the controller is connected.
    Connected,
    /// A reconnect attempt is scheduled.
    Reconnecting {
        /// Failed attempts so far in the current outage.
        attempt: u32,
        /// Wait before the attempt runs.
        delay: Duration,
    },
    /// Reconnection gave up on a non-connection error.
    Failed(String),
    /// The supervisor was stopped.
    Stopped,
}

impl LinkState {
    /// Returns true if the supervisor believes the link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true while a reconnect attempt is pending.
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        matches!(self, Self::Reconnecting { .. })
    }

    /// Returns true if reconnection gave up.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(LinkState::Connected.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
        assert!(
            LinkState::Reconnecting {
                attempt: 0,
                delay: Duration::from_secs(30)
            }
            .is_reconnecting()
        );
        assert!(LinkState::Failed("auth".into()).is_failed());
        assert!(!LinkState::Stopped.is_failed());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller-assigned device identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an HVAC unit as reported by the controller.
///
/// The vendor API hands out numeric-looking strings (`"127934"`); they are
/// kept verbatim so lookups match whatever the controller emits in its
/// update events.
///
/// # Examples
///
/// ```
/// use intesis_lib::types::DeviceId;
///
/// let id = DeviceId::new("127934");
/// assert_eq!(id.as_str(), "127934");
/// assert_eq!(id.to_string(), "127934");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

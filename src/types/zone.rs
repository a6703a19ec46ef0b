// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone damper states.

use std::fmt;

use serde_json::Value;

/// Numeric code the controller reports for an open zone.
const ZONE_ON: u64 = 1;
/// Numeric code for a closed zone.
const ZONE_OFF: u64 = 0;
/// Numeric code for a spill zone (forced open to relieve duct pressure).
const ZONE_SPILL: u64 = 7;

/// Reported state of a single zone.
///
/// Controllers report zone status either as a numeric code or as a word,
/// depending on firmware; both spellings are accepted.
///
/// # Examples
///
/// ```
/// use intesis_lib::types::ZoneStatus;
/// use serde_json::json;
///
/// assert_eq!(ZoneStatus::from_value(&json!(1)), Some(ZoneStatus::On));
/// assert_eq!(ZoneStatus::from_value(&json!("spill")), Some(ZoneStatus::Spill));
/// assert!(ZoneStatus::Spill.is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneStatus {
    /// Zone damper is closed.
    Off,
    /// Zone damper is open.
    On,
    /// Zone is a spill zone and held open by the controller.
    Spill,
}

impl ZoneStatus {
    /// Parses a raw status value from a device snapshot.
    ///
    /// Returns `None` for codes this library does not know.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64()? {
                ZONE_OFF => Some(Self::Off),
                ZONE_ON => Some(Self::On),
                ZONE_SPILL => Some(Self::Spill),
                _ => None,
            },
            Value::String(s) => match s.to_lowercase().as_str() {
                "off" => Some(Self::Off),
                "on" => Some(Self::On),
                "spill" => Some(Self::Spill),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns `true` if air is flowing through the zone.
    ///
    /// Spill zones count as on: the damper is open even though the user did
    /// not ask for it.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On | Self::Spill)
    }

    /// Returns `true` for spill zones.
    #[must_use]
    pub const fn is_spill(&self) -> bool {
        matches!(self, Self::Spill)
    }
}

/// A requested zone state, as sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneCommand {
    /// Open the zone.
    On,
    /// Close the zone.
    Off,
}

impl ZoneCommand {
    /// Returns the word the controller expects.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for ZoneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for ZoneCommand {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

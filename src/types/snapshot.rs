// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state snapshots returned by the controller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DeviceId, ZoneStatus};

/// All devices known to a controller, keyed by id.
///
/// Ordered so that entity discovery is deterministic.
pub type Devices = BTreeMap<DeviceId, DeviceSnapshot>;

/// The controller's current view of one HVAC unit.
///
/// The vendor reports a loose key/value bag whose keys depend on the unit's
/// capabilities. Only the keys the library itself needs get typed accessors;
/// everything else is reachable through [`get`](Self::get).
///
/// # Examples
///
/// ```
/// use intesis_lib::types::{DeviceSnapshot, ZoneStatus};
/// use serde_json::json;
///
/// let snapshot = DeviceSnapshot::from_value(json!({
///     "name": "Lounge",
///     "number_of_zones": 2,
///     "zone_status_1": 1,
///     "zone_status_2": "spill",
/// }))
/// .unwrap();
///
/// assert_eq!(snapshot.name(), Some("Lounge"));
/// assert_eq!(snapshot.number_of_zones(), 2);
/// assert_eq!(snapshot.zone_status(2), Some(ZoneStatus::Spill));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSnapshot(Map<String, Value>);

impl DeviceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a JSON object.
    ///
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Sets a raw attribute, returning the snapshot for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a raw attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the user-assigned unit name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Returns the number of zones the unit drives, 0 if not zoned.
    ///
    /// Zones are addressed with a `u8`; larger counts are capped at 255.
    #[must_use]
    pub fn number_of_zones(&self) -> u8 {
        let Some(count) = self.0.get("number_of_zones").and_then(Value::as_u64) else {
            return 0;
        };
        u8::try_from(count).unwrap_or_else(|_| {
            tracing::warn!(
                count,
                name = self.name().unwrap_or_default(),
                "Zone count exceeds 255, only the first 255 zones are usable"
            );
            u8::MAX
        })
    }

    /// Returns the status of a 1-based zone index.
    #[must_use]
    pub fn zone_status(&self, zone: u8) -> Option<ZoneStatus> {
        self.0
            .get(&format!("zone_status_{zone}"))
            .and_then(ZoneStatus::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(DeviceSnapshot::from_value(json!([1, 2])).is_none());
        assert!(DeviceSnapshot::from_value(json!({})).is_some());
    }

    #[test]
    fn missing_zone_count_is_zero() {
        assert_eq!(DeviceSnapshot::new().number_of_zones(), 0);
        assert_eq!(
            DeviceSnapshot::new()
                .with("number_of_zones", "three")
                .number_of_zones(),
            0
        );
    }

    #[test]
    fn oversized_zone_count_is_capped() {
        assert_eq!(
            DeviceSnapshot::new()
                .with("number_of_zones", 900)
                .number_of_zones(),
            u8::MAX
        );
        assert_eq!(
            DeviceSnapshot::new()
                .with("number_of_zones", 255)
                .number_of_zones(),
            255
        );
    }

    #[test]
    fn builder_sets_attributes() {
        let snapshot = DeviceSnapshot::new()
            .with("name", "Bedroom")
            .with("zone_status_3", 0);

        assert_eq!(snapshot.name(), Some("Bedroom"));
        assert_eq!(snapshot.zone_status(3), Some(ZoneStatus::Off));
        assert_eq!(snapshot.zone_status(4), None);
        assert_eq!(snapshot.get("name"), Some(&json!("Bedroom")));
    }
}

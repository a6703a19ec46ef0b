// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone switches for ducted units.
//!
//! Ducted units report `number_of_zones` and one `zone_status_<n>` per zone.
//! Every zone becomes a switch except spill zones, which the controller holds
//! open on its own and which the user cannot meaningfully toggle.

use crate::controller::Controller;
use crate::error::ControllerError;
use crate::manager::ConnectionSupervisor;
use crate::types::{DeviceId, Devices, ZoneCommand};

/// One switchable zone of a ducted unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSwitch {
    device_id: DeviceId,
    zone: u8,
    name: String,
    unique_id: String,
}

impl ZoneSwitch {
    /// Creates a switch for zone `zone` (1-based) of a device.
    ///
    /// Unnamed devices fall back to their id in the switch name.
    #[must_use]
    pub fn new(device_id: DeviceId, zone: u8, device_name: Option<&str>) -> Self {
        let label = device_name.map_or_else(|| device_id.to_string(), str::to_string);
        Self {
            name: format!("{label} Zone {zone}"),
            unique_id: format!("{device_id}_zone_{zone}"),
            device_id,
            zone,
        }
    }

    /// Returns the device the zone belongs to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the 1-based zone index.
    #[must_use]
    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Returns the display name, e.g. `"Lounge Zone 2"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stable id, e.g. `"12345_zone_2"`.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns whether the zone is open in the given snapshot.
    ///
    /// Unknown devices and unknown status codes read as off.
    #[must_use]
    pub fn is_on(&self, devices: &Devices) -> bool {
        devices
            .get(&self.device_id)
            .and_then(|device| device.zone_status(self.zone))
            .is_some_and(|status| status.is_on())
    }

    /// Returns true if an update for `device_id` concerns this zone.
    ///
    /// Global updates (`None`) concern every zone.
    #[must_use]
    pub fn wants_update(&self, device_id: Option<&DeviceId>) -> bool {
        device_id.is_none_or(|id| *id == self.device_id)
    }

    /// Opens the zone.
    ///
    /// # Errors
    ///
    /// Returns the controller's error unchanged.
    pub async fn turn_on<C: Controller>(
        &self,
        supervisor: &ConnectionSupervisor<C>,
    ) -> Result<(), ControllerError> {
        self.set(supervisor, ZoneCommand::On).await
    }

    /// Closes the zone.
    ///
    /// # Errors
    ///
    /// Returns the controller's error unchanged.
    pub async fn turn_off<C: Controller>(
        &self,
        supervisor: &ConnectionSupervisor<C>,
    ) -> Result<(), ControllerError> {
        self.set(supervisor, ZoneCommand::Off).await
    }

    async fn set<C: Controller>(
        &self,
        supervisor: &ConnectionSupervisor<C>,
        command: ZoneCommand,
    ) -> Result<(), ControllerError> {
        tracing::debug!(zone = %self.unique_id, %command, "Setting zone");
        supervisor
            .set_zone_status(&self.device_id, self.zone, command)
            .await
    }
}

/// Builds one switch per non-spill zone of every zoned device.
///
/// Switches come out ordered by device id, then zone index.
#[must_use]
pub fn discover_zones(devices: &Devices) -> Vec<ZoneSwitch> {
    let mut switches = Vec::new();

    for (device_id, device) in devices {
        let zones = device.number_of_zones();
        if zones == 0 {
            continue;
        }
        tracing::debug!(device = %device_id, zones, "Discovering zones");

        for zone in 1..=zones {
            if device.zone_status(zone).is_some_and(|s| s.is_spill()) {
                tracing::debug!(device = %device_id, zone, "Skipping spill zone");
                continue;
            }
            switches.push(ZoneSwitch::new(device_id.clone(), zone, device.name()));
        }
    }

    switches
}

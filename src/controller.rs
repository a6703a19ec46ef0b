// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The vendor controller seam.
//!
//! The vendor protocol client is not part of this library. Anything that can
//! connect to an Intesis endpoint, report device snapshots and push update
//! notifications implements [`Controller`], and the
//! [`ConnectionSupervisor`](crate::ConnectionSupervisor) wraps it.

use std::future::Future;

use crate::error::ControllerError;
use crate::subscription::UpdateCallback;
use crate::types::{DeviceId, DeviceSnapshot, Devices, ZoneCommand};

/// Operations the supervisor and its entities need from a vendor controller.
///
/// Implementations own their transport and internal liveness tracking.
/// `is_connected` is the controller's own view of the link and is expected to
/// flip to `false` before the controller fires the update that reports the
/// loss.
///
/// # Update listeners
///
/// Controllers keep their own listener list. The supervisor registers exactly
/// one listener (its relay) and expects the controller to invoke it with the
/// changed device id, or `None` for a global change.
pub trait Controller: Send + Sync + 'static {
    /// Opens the connection to the controller's endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Authentication`] if the credentials are
    /// rejected and [`ControllerError::Connection`] if the endpoint cannot be
    /// reached.
    fn connect(&self) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Closes the connection and releases the controller's resources.
    fn stop(&self) -> impl Future<Output = ()> + Send;

    /// Returns the controller's own view of its connection.
    fn is_connected(&self) -> bool;

    /// Returns a snapshot of every known device.
    fn get_devices(&self) -> Devices;

    /// Returns a snapshot of one device.
    fn get_device(&self, device_id: &DeviceId) -> Option<DeviceSnapshot> {
        self.get_devices().remove(device_id)
    }

    /// Opens or closes one zone of a device.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] if the request cannot be delivered.
    fn set_zone_status(
        &self,
        device_id: &DeviceId,
        zone: u8,
        command: ZoneCommand,
    ) -> impl Future<Output = Result<(), ControllerError>> + Send;

    /// Registers a listener for update notifications.
    fn add_update_callback(&self, callback: UpdateCallback);

    /// Removes a previously registered listener. Unknown listeners are ignored.
    fn remove_update_callback(&self, callback: &UpdateCallback);
}

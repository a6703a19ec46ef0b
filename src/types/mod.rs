// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared between the controller and its subscribers.
//!
//! # Types
//!
//! - [`DeviceId`] - Controller-assigned unit identifier
//! - [`DeviceType`] / [`DeviceClass`] - Vendor flavour and cloud/local hosting
//! - [`DeviceSnapshot`] / [`Devices`] - Controller state for one or all units
//! - [`ZoneStatus`] / [`ZoneCommand`] - Zone damper state and requests

mod device_id;
mod device_type;
mod snapshot;
mod zone;

pub use device_id::DeviceId;
pub use device_type::{DeviceClass, DeviceType};
pub use snapshot::{DeviceSnapshot, Devices};
pub use zone::{ZoneCommand, ZoneStatus};

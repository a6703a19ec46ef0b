// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `intesis_lib` - Connection supervision for Intesis HVAC controllers.
//!
//! This library keeps an IntesisHome, anywAiR, airconwithme or IntesisBox
//! controller connected on behalf of a smart-home host and relays its
//! updates to the host's entities.
//!
//! The vendor protocol client itself is not part of this crate: anything
//! implementing [`Controller`](controller::Controller) can be supervised.
//!
//! # Supported Features
//!
//! - **Update fan-out**: entities subscribe once, the supervisor relays every
//!   controller update to them in order
//! - **Auto-reconnection**: loss detection on every update, jittered first
//!   attempt for cloud services, exponential backoff capped at five minutes
//! - **Entry lifecycle**: explicit registry of supervisors keyed by entry
//! - **Zone switches**: discovery of switchable zones on ducted units
//!
//! # Quick Start
//!
//! ```no_run
//! use intesis_lib::ConnectionSupervisor;
//! use intesis_lib::controller::Controller;
//! use intesis_lib::manager::EntryConfig;
//! use intesis_lib::subscription::UpdateCallback;
//! use intesis_lib::types::DeviceType;
//!
//! # async fn example<C: Controller>(controller: C) -> Result<(), intesis_lib::ControllerError> {
//! let entry = EntryConfig::new("entry-1", "account", DeviceType::AirconWithMe)
//!     .with_credentials("user@example.com", "secret");
//! let supervisor = ConnectionSupervisor::new(
//!     tokio::runtime::Handle::current(),
//!     controller,
//!     entry,
//!     DeviceType::AirconWithMe,
//! );
//! supervisor.connect().await?;
//!
//! // Refresh an entity whenever its unit (or everything) changes
//! supervisor.add_update_callback(UpdateCallback::new(|device_id| async move {
//!     println!("update for {device_id:?}");
//! }));
//!
//! // Zone switches for ducted units
//! for zone in intesis_lib::zones::discover_zones(&supervisor.get_devices()) {
//!     println!("{} -> {}", zone.name(), zone.unique_id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod manager;
pub mod subscription;
pub mod types;
pub mod zones;

pub use controller::Controller;
pub use error::{ControllerError, Error, Result};
pub use manager::{
    ConnectionSupervisor, EntryConfig, LinkState, ReconnectPolicy, SupervisorRegistry,
    setup_entry, unload_entry,
};
pub use subscription::{SubscriberSet, UpdateCallback};
pub use types::{DeviceClass, DeviceId, DeviceSnapshot, DeviceType, Devices, ZoneCommand, ZoneStatus};
pub use zones::{ZoneSwitch, discover_zones};

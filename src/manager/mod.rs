// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection supervision for Intesis controllers.
//!
//! # Overview
//!
//! The [`ConnectionSupervisor`] sits between a vendor controller and the
//! entities that render its devices. It provides:
//!
//! - **Update fan-out**: one listener on the controller, any number of
//!   subscribers on the supervisor, notified in registration order
//! - **Loss detection**: the controller's link flag is checked after every
//!   update
//! - **Auto-reconnection**: jittered first attempt for cloud devices, fixed
//!   delay for local ones, then exponential backoff up to five minutes
//! - **Entry lifecycle**: [`setup_entry`] and [`unload_entry`] maintain an
//!   explicit [`SupervisorRegistry`]
//!
//! # Examples
//!
//! ```no_run
//! use intesis_lib::controller::Controller;
//! use intesis_lib::manager::{EntryConfig, SupervisorRegistry, setup_entry, unload_entry};
//! use intesis_lib::types::DeviceType;
//!
//! # async fn example<C: Controller>(controller: C) -> intesis_lib::Result<()> {
//! let registry = SupervisorRegistry::new();
//!
//! let entry = EntryConfig::new("entry-1", "living-room-box", DeviceType::IntesisBox)
//!     .with_host("192.168.1.40");
//! let supervisor =
//!     setup_entry(&registry, tokio::runtime::Handle::current(), entry, controller).await?;
//!
//! let mut link = supervisor.watch_link_state();
//! tokio::spawn(async move {
//!     while link.changed().await.is_ok() {
//!         println!("link: {:?}", *link.borrow());
//!     }
//! });
//!
//! unload_entry(&registry, "living-room-box").await?;
//! # Ok(())
//! # }
//! ```

mod entry_config;
mod link_state;
mod policy;
mod registry;
mod supervisor;

pub use entry_config::EntryConfig;
pub use link_state::LinkState;
pub use policy::ReconnectPolicy;
pub use registry::{SupervisorRegistry, setup_entry, unload_entry};
pub use supervisor::{ConnectionSupervisor, SupervisorBuilder};

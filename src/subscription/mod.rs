// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for controller updates.
//!
//! Entities register an [`UpdateCallback`] with the supervisor when they are
//! attached and remove it when they are detached. The supervisor keeps them
//! in a [`SubscriberSet`] and awaits each one, in order, whenever the
//! controller reports a change.
//!
//! # Usage
//!
//! ```no_run
//! use intesis_lib::subscription::UpdateCallback;
//! # use intesis_lib::ConnectionSupervisor;
//! # use intesis_lib::controller::Controller;
//!
//! # fn example<C: Controller>(supervisor: &ConnectionSupervisor<C>) {
//! let callback = UpdateCallback::new(|device_id| async move {
//!     match device_id {
//!         Some(id) => println!("device {id} changed"),
//!         None => println!("refresh everything"),
//!     }
//! });
//!
//! supervisor.add_update_callback(callback.clone());
//!
//! // Later, on detach
//! supervisor.remove_update_callback(&callback);
//! # }
//! ```

mod callback;

pub use callback::{SubscriberSet, UpdateCallback, UpdateFuture};

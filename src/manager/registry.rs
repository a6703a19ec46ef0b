// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of running supervisors and the entry setup/unload flow.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use tokio::runtime::Handle;

use crate::controller::Controller;
use crate::error::{Error, Result};

use super::entry_config::EntryConfig;
use super::supervisor::ConnectionSupervisor;

/// Supervisors of the configured entries, keyed by entry unique id.
///
/// The host creates one registry and hands it to whatever needs to look a
/// supervisor up (platform setup, services). [`setup_entry`] inserts and
/// [`unload_entry`] removes; nothing else owns the supervisors.
pub struct SupervisorRegistry<C: Controller> {
    supervisors: RwLock<BTreeMap<String, ConnectionSupervisor<C>>>,
}

impl<C: Controller> SupervisorRegistry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supervisors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a supervisor, returning the one it replaced.
    pub fn insert(
        &self,
        unique_id: impl Into<String>,
        supervisor: ConnectionSupervisor<C>,
    ) -> Option<ConnectionSupervisor<C>> {
        self.supervisors.write().insert(unique_id.into(), supervisor)
    }

    /// Returns the supervisor for an entry.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<ConnectionSupervisor<C>> {
        self.supervisors.read().get(unique_id).cloned()
    }

    /// Removes and returns the supervisor for an entry.
    pub fn remove(&self, unique_id: &str) -> Option<ConnectionSupervisor<C>> {
        self.supervisors.write().remove(unique_id)
    }

    /// Returns true if an entry is registered.
    #[must_use]
    pub fn contains(&self, unique_id: &str) -> bool {
        self.supervisors.read().contains_key(unique_id)
    }

    /// Returns the registered entry ids in order.
    #[must_use]
    pub fn unique_ids(&self) -> Vec<String> {
        self.supervisors.read().keys().cloned().collect()
    }

    /// Returns the number of registered supervisors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.supervisors.read().len()
    }

    /// Returns true if no supervisor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.supervisors.read().is_empty()
    }
}

impl<C: Controller> Default for SupervisorRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Controller> fmt::Debug for SupervisorRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorRegistry")
            .field("entries", &self.unique_ids())
            .finish()
    }
}

/// Sets up an entry: validates it, connects its controller under a new
/// supervisor and registers the supervisor.
///
/// If a supervisor was already registered for the same unique id it is
/// stopped and replaced.
///
/// # Errors
///
/// - [`Error::InvalidEntry`] if the entry lacks fields its device type needs
/// - [`Error::EntryNotReady`] if the controller rejects the credentials or
///   cannot be reached; the host should retry later
/// - [`Error::Controller`] for any other controller failure
pub async fn setup_entry<C: Controller>(
    registry: &SupervisorRegistry<C>,
    runtime: Handle,
    entry: EntryConfig,
    controller: C,
) -> Result<ConnectionSupervisor<C>> {
    entry.validate()?;

    let unique_id = entry.unique_id.clone();
    let device_type = entry.device_type;
    let supervisor = ConnectionSupervisor::new(runtime, controller, entry, device_type);

    if let Err(err) = supervisor.connect().await {
        tracing::warn!(entry = %unique_id, error = %err, "Controller setup failed");
        return if err.is_connection() || err.is_authentication() {
            Err(Error::EntryNotReady {
                entry: unique_id,
                source: err,
            })
        } else {
            Err(err.into())
        };
    }

    if let Some(previous) = registry.insert(unique_id.clone(), supervisor.clone()) {
        tracing::warn!(entry = %unique_id, "Replacing supervisor of an entry set up twice");
        previous.stop().await;
    }

    tracing::info!(
        entry = %unique_id,
        device_type = %device_type,
        devices = supervisor.get_devices().len(),
        "Entry set up"
    );
    Ok(supervisor)
}

/// Unloads an entry: removes its supervisor from the registry and stops it.
///
/// # Errors
///
/// Returns [`Error::EntryNotFound`] if no supervisor is registered.
pub async fn unload_entry<C: Controller>(
    registry: &SupervisorRegistry<C>,
    unique_id: &str,
) -> Result<()> {
    let supervisor = registry
        .remove(unique_id)
        .ok_or_else(|| Error::EntryNotFound(unique_id.to_string()))?;

    supervisor.stop().await;
    tracing::info!(entry = %unique_id, "Entry unloaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::subscription::UpdateCallback;
    use crate::types::{DeviceId, DeviceType, Devices, ZoneCommand};

    struct Idle;

    impl Controller for Idle {
        async fn connect(&self) -> std::result::Result<(), ControllerError> {
            Ok(())
        }
        async fn stop(&self) {}
        fn is_connected(&self) -> bool {
            true
        }
        fn get_devices(&self) -> Devices {
            Devices::new()
        }
        async fn set_zone_status(
            &self,
            _device_id: &DeviceId,
            _zone: u8,
            _command: ZoneCommand,
        ) -> std::result::Result<(), ControllerError> {
            Ok(())
        }
        fn add_update_callback(&self, _callback: UpdateCallback) {}
        fn remove_update_callback(&self, _callback: &UpdateCallback) {}
    }

    fn supervisor(unique_id: &str) -> ConnectionSupervisor<Idle> {
        let entry = EntryConfig::new("entry", unique_id, DeviceType::IntesisBox).with_host("h");
        ConnectionSupervisor::new(Handle::current(), Idle, entry, DeviceType::IntesisBox)
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let registry = SupervisorRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.insert("b", supervisor("b")).is_none());
        assert!(registry.insert("a", supervisor("a")).is_none());
        assert!(registry.insert("a", supervisor("a")).is_some());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.unique_ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.get("a").map(|s| s.entry().unique_id.clone()), Some("a".into()));

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(!registry.contains("a"));
        assert!(registry.get("a").is_none());
    }

    #[tokio::test]
    async fn debug_lists_entries() {
        let registry = SupervisorRegistry::new();
        registry.insert("box-1", supervisor("box-1"));

        assert_eq!(
            format!("{registry:?}"),
            r#"SupervisorRegistry { entries: ["box-1"] }"#
        );
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration entry for one controller installation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DeviceType;

/// The host's configuration entry for one controller.
///
/// The supervisor carries it around without interpreting it; it is read when
/// an entry is set up and to key the [`SupervisorRegistry`](super::SupervisorRegistry).
/// Field names follow the host's entry data, so an entry can be deserialized
/// straight from it.
///
/// # Examples
///
/// ```
/// use intesis_lib::manager::EntryConfig;
/// use intesis_lib::types::DeviceType;
///
/// // Cloud account
/// let entry = EntryConfig::new("entry-1", "user@example.com", DeviceType::IntesisHome)
///     .with_credentials("user@example.com", "secret");
/// assert!(entry.validate().is_ok());
///
/// // Local IntesisBox
/// let entry = EntryConfig::new("entry-2", "192.168.1.40", DeviceType::IntesisBox)
///     .with_host("192.168.1.40");
/// assert!(entry.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Host-assigned entry identifier.
    pub entry_id: String,
    /// Stable identifier of the installation, used as the registry key.
    pub unique_id: String,
    /// Controller flavour.
    #[serde(rename = "device")]
    pub device_type: DeviceType,
    /// Address of a local controller.
    #[serde(default)]
    pub host: Option<String>,
    /// Account or device user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Account or device password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl EntryConfig {
    /// Creates an entry without host or credentials.
    #[must_use]
    pub fn new(
        entry_id: impl Into<String>,
        unique_id: impl Into<String>,
        device_type: DeviceType,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            unique_id: unique_id.into(),
            device_type,
            host: None,
            username: None,
            password: None,
        }
    }

    /// Sets the local controller address.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the user name and password.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Checks that the fields the device type needs are present.
    ///
    /// Cloud types need credentials, IntesisBox needs a host, and local
    /// IntesisHome gateways need both.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntry`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        let needs_host = !self.device_type.is_cloud();
        let needs_credentials = self.device_type != DeviceType::IntesisBox;

        if needs_host && is_blank(self.host.as_deref()) {
            return Err(self.invalid("host is required"));
        }
        if needs_credentials && is_blank(self.username.as_deref()) {
            return Err(self.invalid("username is required"));
        }
        if needs_credentials && self.password.is_none() {
            return Err(self.invalid("password is required"));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidEntry {
            entry: self.unique_id.clone(),
            reason: format!("{reason} for {}", self.device_type),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl fmt::Debug for EntryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryConfig")
            .field("entry_id", &self.entry_id)
            .field("unique_id", &self.unique_id)
            .field("device_type", &self.device_type)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_entry_requires_credentials() {
        let entry = EntryConfig::new("e", "u", DeviceType::AirconWithMe);
        let err = entry.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidEntry { ref reason, .. } if reason.contains("username")));

        let entry = entry.with_credentials("user", "pass");
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn intesisbox_requires_only_host() {
        let entry = EntryConfig::new("e", "u", DeviceType::IntesisBox);
        let err = entry.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidEntry { ref reason, .. } if reason.contains("host")));

        assert!(entry.with_host("10.0.0.2").validate().is_ok());
    }

    #[test]
    fn local_intesishome_requires_host_and_credentials() {
        let entry = EntryConfig::new("e", "u", DeviceType::IntesisHomeLocal).with_host("10.0.0.3");
        assert!(entry.validate().is_err());

        let entry = entry.with_credentials("admin", "admin");
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn blank_host_is_rejected() {
        let entry = EntryConfig::new("e", "u", DeviceType::IntesisBox).with_host("  ");
        assert!(entry.validate().is_err());
    }

    #[test]
    fn deserializes_host_entry_data() {
        let entry: EntryConfig = serde_json::from_value(serde_json::json!({
            "entry_id": "test_entry_id",
            "unique_id": "test_unique_id",
            "device": "IntesisHome",
            "host": "1.2.3.4",
            "username": "user",
            "password": "password",
        }))
        .unwrap();

        assert_eq!(entry.device_type, DeviceType::IntesisHome);
        assert_eq!(entry.host.as_deref(), Some("1.2.3.4"));
        assert_eq!(entry.password.as_deref(), Some("password"));
    }

    #[test]
    fn password_is_not_serialized_or_printed() {
        let entry = EntryConfig::new("e", "u", DeviceType::IntesisHome)
            .with_credentials("user", "hunter2");

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("hunter2"));

        let debug = format!("{entry:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}

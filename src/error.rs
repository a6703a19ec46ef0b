// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `intesis_lib` library.
//!
//! Controller failures are reported as [`ControllerError`], which keeps the
//! authentication and connection kinds distinguishable. Everything the
//! supervisor and the entry lifecycle can fail with is gathered in [`Error`].

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The wrapped controller reported a failure.
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// An entry could not be set up because its controller is unreachable
    /// or rejected the credentials. The host should retry setup later.
    #[error("entry {entry} is not ready: {source}")]
    EntryNotReady {
        /// Unique id of the entry being set up.
        entry: String,
        /// The controller failure that prevented setup.
        #[source]
        source: ControllerError,
    },

    /// The entry is missing a field its device type needs.
    #[error("invalid entry {entry}: {reason}")]
    InvalidEntry {
        /// Unique id of the offending entry.
        entry: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No supervisor is registered under the given entry id.
    #[error("no supervisor registered for entry {0}")]
    EntryNotFound(String),

    /// The device type string is not one of the known vendor types.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),
}

/// Failures reported by a vendor controller.
///
/// The supervisor only distinguishes the connection class (retried with
/// backoff during a reconnection episode) from everything else (ends the
/// episode).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The controller rejected the configured credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The controller could not reach its endpoint.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other controller failure.
    #[error("{0}")]
    Other(String),
}

impl ControllerError {
    /// Returns `true` for connection-class failures.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` for authentication failures.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Link status and notification snapshots.

use std::fmt;

use super::DeviceState;

/// Status of the push connection to the device.
///
/// Lets observers tell "state unknown" apart from "state known but the link
/// is degraded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// The stream has not been opened yet.
    #[default]
    Connecting,
    /// The event stream is open.
    Connected,
    /// The device could not be reached or the stream dropped.
    Disconnected,
    /// Waiting for the next connection attempt.
    Reconnecting,
}

impl ConnectionStatus {
    /// Returns `true` if the event stream is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the link is down or being re-established.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Reconnecting)
    }

    /// Returns a lowercase name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrigin {
    /// A full status fetch (startup or [`refresh`](crate::Coordinator::refresh)).
    Snapshot,
    /// An optimistic local write, not yet confirmed by the device.
    Local,
    /// A push frame from the device.
    Device,
    /// The connection status changed; device state is untouched.
    Connection,
}

/// Immutable view delivered to subscribers after each committed change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StateSnapshot {
    /// Device state after the change.
    pub state: DeviceState,
    /// Connection status after the change.
    pub status: ConnectionStatus,
    /// Cause of the change.
    pub origin: UpdateOrigin,
    /// Position of this change in commit order, starting at 1.
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_predicates() {
        assert!(ConnectionStatus::Connected.is_connected());
        assert!(!ConnectionStatus::Connecting.is_connected());
        assert!(ConnectionStatus::Reconnecting.is_degraded());
        assert!(ConnectionStatus::Disconnected.is_degraded());
        assert!(!ConnectionStatus::Connected.is_degraded());
    }

    #[test]
    fn status_display() {
        assert_eq!(ConnectionStatus::Reconnecting.to_string(), "reconnecting");
    }
}

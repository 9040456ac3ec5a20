// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] holds the last known settings of the clock, while
//! [`PartialStateUpdate`] carries new values for some of them. Updates
//! come from three places: the initial status fetch, push frames, and
//! optimistic user writes; all of them are merged with the same
//! per-field last-write-wins rule.
//!
//! # Examples
//!
//! ```
//! use wordclock_lib::state::{DeviceState, PartialStateUpdate};
//!
//! let mut state = DeviceState::new();
//! let frame = PartialStateUpdate::from_json_str(r#"{"brightness": 80, "foo": 1}"#).unwrap();
//! state.apply(&frame);
//!
//! assert_eq!(state.brightness().value(), 80);
//! ```

mod connection;
mod device_state;
mod state_update;

pub use connection::{ConnectionStatus, StateSnapshot, UpdateOrigin};
pub use device_state::DeviceState;
pub use state_update::PartialStateUpdate;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for WordClock settings.
//!
//! Each type ensures its value is within the device's accepted domain at
//! construction time, so a [`DeviceState`](crate::state::DeviceState) can
//! never hold an out-of-range setting.
//!
//! # Types
//!
//! - [`Brightness`] - Face brightness (1-255)
//! - [`RgbColor`] - Word color (three 0-255 channels)
//! - [`Language`] - Word set (Dialekt/Deutsch)
//! - [`TransitionEffect`] - Animation between times (None/Fade/Wipe/Sparkle)
//! - [`TransitionSpeed`] - Animation speed (0-4)
//! - [`PrefixMode`] - Prefix words display (Always/Random/Off)

mod brightness;
mod language;
mod prefix_mode;
mod rgb_color;
mod transition;

pub use brightness::Brightness;
pub use language::Language;
pub use prefix_mode::PrefixMode;
pub use rgb_color::RgbColor;
pub use transition::{TransitionEffect, TransitionSpeed};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use crate::types::{Brightness, Language, PrefixMode, RgbColor, TransitionEffect, TransitionSpeed};

use super::PartialStateUpdate;

/// Last known settings of a WordClock.
///
/// Every field is always within its declared domain: the value types reject
/// invalid input, and merging a [`PartialStateUpdate`] only ever replaces a
/// field with a validated value.
///
/// # Examples
///
/// ```
/// use wordclock_lib::state::{DeviceState, PartialStateUpdate};
/// use wordclock_lib::types::Brightness;
///
/// let mut state = DeviceState::new();
/// let update = PartialStateUpdate::new().with_brightness(Brightness::new(80).unwrap());
///
/// assert!(state.apply(&update));
/// assert_eq!(state.brightness().value(), 80);
///
/// // Applying the same update again changes nothing
/// assert!(!state.apply(&update));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    is_on: bool,
    brightness: Brightness,
    color: RgbColor,
    language: Language,
    super_bright: bool,
    transition_effect: TransitionEffect,
    prefix_mode: PrefixMode,
    transition_speed: TransitionSpeed,
}

impl DeviceState {
    /// Creates a state holding the device defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state by merging `update` over the defaults.
    #[must_use]
    pub fn from_update(update: &PartialStateUpdate) -> Self {
        let mut state = Self::new();
        state.apply(update);
        state
    }

    /// Returns `true` if the face is lit.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Returns the word color.
    #[must_use]
    pub fn color(&self) -> RgbColor {
        self.color
    }

    /// Returns the language.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns `true` if super-bright mode is enabled.
    #[must_use]
    pub fn super_bright(&self) -> bool {
        self.super_bright
    }

    /// Returns the transition effect.
    #[must_use]
    pub fn transition_effect(&self) -> TransitionEffect {
        self.transition_effect
    }

    /// Returns the prefix mode.
    #[must_use]
    pub fn prefix_mode(&self) -> PrefixMode {
        self.prefix_mode
    }

    /// Returns the transition speed.
    #[must_use]
    pub fn transition_speed(&self) -> TransitionSpeed {
        self.transition_speed
    }

    /// Merges an update into this state and returns whether anything changed.
    ///
    /// Fields absent from `update` keep their current value. The merge is
    /// idempotent: applying the same update twice yields the same state.
    pub fn apply(&mut self, update: &PartialStateUpdate) -> bool {
        let before = self.clone();

        if let Some(v) = update.is_on {
            self.is_on = v;
        }
        if let Some(v) = update.brightness {
            self.brightness = v;
        }
        if let Some(v) = update.red {
            self.color = self.color.with_red(v);
        }
        if let Some(v) = update.green {
            self.color = self.color.with_green(v);
        }
        if let Some(v) = update.blue {
            self.color = self.color.with_blue(v);
        }
        if let Some(v) = update.language {
            self.language = v;
        }
        if let Some(v) = update.super_bright {
            self.super_bright = v;
        }
        if let Some(v) = update.transition_effect {
            self.transition_effect = v;
        }
        if let Some(v) = update.prefix_mode {
            self.prefix_mode = v;
        }
        if let Some(v) = update.transition_speed {
            self.transition_speed = v;
        }

        *self != before
    }
}

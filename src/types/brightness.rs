// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for the clock face.
//!
//! The device accepts brightness on a raw 8-bit scale where `0` is not a
//! valid level: switching the face off is done through the separate
//! `enabled` flag.

use std::fmt;

use crate::error::ValueError;

/// Face brightness (1-255).
///
/// # Examples
///
/// ```
/// use wordclock_lib::types::Brightness;
///
/// let half = Brightness::new(128).unwrap();
/// assert_eq!(half.value(), 128);
///
/// // Zero is not a brightness level
/// assert!(Brightness::new(0).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    /// Dimmest valid level.
    pub const MIN: Self = Self(1);

    /// Full brightness.
    pub const MAX: Self = Self(255);

    /// Level used when the device state is not known yet.
    pub const DEFAULT: Self = Self(128);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is 0.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value == 0 {
            return Err(Self::out_of_range(0));
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping 0 up to 1.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value == 0 { Self::MIN } else { Self(value) }
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the level as a percentage of full brightness.
    #[must_use]
    pub fn as_percent(&self) -> f32 {
        f32::from(self.0) * 100.0 / 255.0
    }

    fn out_of_range(actual: i64) -> ValueError {
        ValueError::OutOfRange {
            min: 1,
            max: 255,
            actual,
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| Self::out_of_range(value))
            .and_then(Self::new)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Animation played when the displayed words change.
//!
//! The device encodes the effect as an integer code (`transition`) and its
//! speed as a small integer (`transitionSpeed`).

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Transition animation between two displayed times.
///
/// | Code | Effect |
/// |------|--------|
/// | 0 | None |
/// | 1 | Fade |
/// | 2 | Wipe |
/// | 3 | Sparkle |
///
/// # Examples
///
/// ```
/// use wordclock_lib::types::TransitionEffect;
///
/// let effect = TransitionEffect::from_code(2).unwrap();
/// assert_eq!(effect, TransitionEffect::Wipe);
/// assert_eq!("Sparkle".parse::<TransitionEffect>().unwrap().code(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransitionEffect {
    /// Words switch instantly.
    #[default]
    None,
    /// Old words fade out while new ones fade in.
    Fade,
    /// Words are wiped across the face.
    Wipe,
    /// Letters sparkle into place.
    Sparkle,
}

impl TransitionEffect {
    /// Every effect, in code order.
    pub const ALL: [Self; 4] = [Self::None, Self::Fade, Self::Wipe, Self::Sparkle];

    /// Looks an effect up by its wire code.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidOption` for unknown codes.
    pub fn from_code(code: i64) -> Result<Self, ValueError> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Fade),
            2 => Ok(Self::Wipe),
            3 => Ok(Self::Sparkle),
            _ => Err(ValueError::InvalidOption {
                kind: "transition",
                value: code.to_string(),
            }),
        }
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Fade => 1,
            Self::Wipe => 2,
            Self::Sparkle => 3,
        }
    }

    /// Returns the option label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Fade => "Fade",
            Self::Wipe => "Wipe",
            Self::Sparkle => "Sparkle",
        }
    }
}

impl fmt::Display for TransitionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransitionEffect {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code);
        }
        Self::ALL
            .into_iter()
            .find(|effect| effect.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValueError::InvalidOption {
                kind: "transition",
                value: s.to_string(),
            })
    }
}

impl TryFrom<u8> for TransitionEffect {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value))
    }
}

impl From<TransitionEffect> for u8 {
    fn from(value: TransitionEffect) -> Self {
        value.code()
    }
}

/// Speed of the transition animation (0-4).
///
/// # Examples
///
/// ```
/// use wordclock_lib::types::TransitionSpeed;
///
/// let speed = TransitionSpeed::new(3).unwrap();
/// assert_eq!(speed.value(), 3);
/// assert!(TransitionSpeed::new(5).is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct TransitionSpeed(u8);

impl TransitionSpeed {
    /// Minimum speed value.
    pub const MIN: u8 = 0;

    /// Maximum speed value.
    pub const MAX: u8 = 4;

    /// Creates a new transition speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 4.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a transition speed, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    /// Returns the speed value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TransitionSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for TransitionSpeed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for TransitionSpeed {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: value,
            })
            .and_then(Self::new)
    }
}

impl From<TransitionSpeed> for u8 {
    fn from(value: TransitionSpeed) -> Self {
        value.0
    }
}

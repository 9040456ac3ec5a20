// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whether the clock lights its "ES IST" style prefix words.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Prefix display mode.
///
/// | Code | Mode |
/// |------|------|
/// | 0 | Always |
/// | 1 | Random |
/// | 2 | Off |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PrefixMode {
    /// Prefix is shown with every time.
    #[default]
    Always,
    /// Prefix is shown on some minutes only.
    Random,
    /// Prefix is never shown.
    Off,
}

impl PrefixMode {
    /// Every mode, in code order.
    pub const ALL: [Self; 3] = [Self::Always, Self::Random, Self::Off];

    /// Looks a mode up by its wire code.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidOption` for unknown codes.
    pub fn from_code(code: i64) -> Result<Self, ValueError> {
        match code {
            0 => Ok(Self::Always),
            1 => Ok(Self::Random),
            2 => Ok(Self::Off),
            _ => Err(ValueError::InvalidOption {
                kind: "prefix mode",
                value: code.to_string(),
            }),
        }
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Always => 0,
            Self::Random => 1,
            Self::Off => 2,
        }
    }

    /// Returns the option label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::Random => "Random",
            Self::Off => "Off",
        }
    }
}

impl fmt::Display for PrefixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PrefixMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code);
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValueError::InvalidOption {
                kind: "prefix mode",
                value: s.to_string(),
            })
    }
}

impl TryFrom<u8> for PrefixMode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value))
    }
}

impl From<PrefixMode> for u8 {
    fn from(value: PrefixMode) -> Self {
        value.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(PrefixMode::from_code(0).unwrap(), PrefixMode::Always);
        assert_eq!(PrefixMode::from_code(2).unwrap(), PrefixMode::Off);
        assert!(PrefixMode::from_code(3).is_err());
    }

    #[test]
    fn parse_label() {
        assert_eq!("random".parse::<PrefixMode>().unwrap(), PrefixMode::Random);
        assert_eq!(
            "Sometimes".parse::<PrefixMode>(),
            Err(ValueError::InvalidOption {
                kind: "prefix mode",
                value: "Sometimes".to_string()
            })
        );
    }
}

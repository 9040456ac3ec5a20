// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Word set used to spell out the time.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Language of the clock face.
///
/// On the wire the device uses lowercase identifiers (`"dialekt"`,
/// `"deutsch"`); [`label`](Self::label) gives the display form.
///
/// # Examples
///
/// ```
/// use wordclock_lib::types::Language;
///
/// let lang: Language = "Deutsch".parse().unwrap();
/// assert_eq!(lang.as_str(), "deutsch");
/// assert_eq!(lang.label(), "Deutsch");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Swiss-German dialect word set.
    #[default]
    Dialekt,
    /// Standard German word set.
    Deutsch,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Self; 2] = [Self::Dialekt, Self::Deutsch];

    /// Returns the wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dialekt => "dialekt",
            Self::Deutsch => "deutsch",
        }
    }

    /// Returns the human readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Dialekt => "Dialekt",
            Self::Deutsch => "Deutsch",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dialekt" => Ok(Self::Dialekt),
            "deutsch" => Ok(Self::Deutsch),
            _ => Err(ValueError::InvalidLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_and_label() {
        assert_eq!("dialekt".parse::<Language>().unwrap(), Language::Dialekt);
        assert_eq!("DEUTSCH".parse::<Language>().unwrap(), Language::Deutsch);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            "english".parse::<Language>(),
            Err(ValueError::InvalidLanguage("english".to_string()))
        );
    }

    #[test]
    fn serde_uses_wire_identifier() {
        assert_eq!(
            serde_json::to_string(&Language::Deutsch).unwrap(),
            "\"deutsch\""
        );
        assert!(serde_json::from_str::<Language>("\"Deutsch\"").is_err());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color of the illuminated words.

use std::fmt;

/// RGB color with 8-bit channels (0-255).
///
/// The device reports and accepts each channel as a separate field
/// (`red`, `green`, `blue`), so a partial update may touch only one of them.
///
/// # Examples
///
/// ```
/// use wordclock_lib::types::RgbColor;
///
/// let orange = RgbColor::new(255, 128, 0);
/// assert_eq!(orange.green(), 128);
/// assert_eq!(orange.to_string(), "#FF8000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Pure white, the device's factory color.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns a copy with the red channel replaced.
    #[must_use]
    pub const fn with_red(self, red: u8) -> Self {
        Self { red, ..self }
    }

    /// Returns a copy with the green channel replaced.
    #[must_use]
    pub const fn with_green(self, green: u8) -> Self {
        Self { green, ..self }
    }

    /// Returns a copy with the blue channel replaced.
    #[must_use]
    pub const fn with_blue(self, blue: u8) -> Self {
        Self { blue, ..self }
    }

    /// Returns the channels as a tuple.
    #[must_use]
    pub const fn as_tuple(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_white() {
        assert_eq!(RgbColor::default(), RgbColor::WHITE);
    }

    #[test]
    fn channel_replacement_keeps_others() {
        let color = RgbColor::new(10, 20, 30).with_green(99);
        assert_eq!(color.as_tuple(), (10, 99, 30));
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(RgbColor::new(255, 100, 50).to_string(), "#FF6432");
    }

    #[test]
    fn from_tuple() {
        let color: RgbColor = (1, 2, 3).into();
        assert_eq!(color.red(), 1);
        assert_eq!(color.blue(), 3);
    }
}

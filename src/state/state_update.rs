// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial state updates.
//!
//! A [`PartialStateUpdate`] carries new values for a subset of the device
//! settings. The same type is used for user-initiated writes (serialized as
//! the body of `POST /update`) and for decoded push frames and status
//! payloads.
//!
//! Decoding is lenient per field: an unknown key is ignored, and a known key
//! whose value is missing, mistyped or out of domain is dropped so that the
//! corresponding setting keeps its previous value when merged.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FrameParseError;
use crate::types::{Brightness, Language, PrefixMode, RgbColor, TransitionEffect, TransitionSpeed};

/// New values for some of the device settings.
///
/// Fields left as `None` are not touched when the update is merged into a
/// [`DeviceState`](super::DeviceState) and are not sent to the device.
///
/// # Examples
///
/// ```
/// use wordclock_lib::state::PartialStateUpdate;
/// use wordclock_lib::types::{Brightness, RgbColor};
///
/// let update = PartialStateUpdate::new()
///     .with_brightness(Brightness::new(80).unwrap())
///     .with_color(RgbColor::new(255, 0, 0));
///
/// assert_eq!(update.len(), 4);
/// assert_eq!(
///     update.to_json(),
///     serde_json::json!({"brightness": 80, "red": 255, "green": 0, "blue": 0})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialStateUpdate {
    /// Whether the face is lit.
    #[serde(rename = "enabled", skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    /// Face brightness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<Brightness>,
    /// Red channel of the word color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<u8>,
    /// Green channel of the word color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<u8>,
    /// Blue channel of the word color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<u8>,
    /// Word set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Super-bright boost.
    #[serde(rename = "superBright", skip_serializing_if = "Option::is_none")]
    pub super_bright: Option<bool>,
    /// Transition animation.
    #[serde(rename = "transition", skip_serializing_if = "Option::is_none")]
    pub transition_effect: Option<TransitionEffect>,
    /// Prefix display mode.
    #[serde(rename = "prefixMode", skip_serializing_if = "Option::is_none")]
    pub prefix_mode: Option<PrefixMode>,
    /// Transition animation speed.
    #[serde(rename = "transitionSpeed", skip_serializing_if = "Option::is_none")]
    pub transition_speed: Option<TransitionSpeed>,
}

impl PartialStateUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the on/off flag.
    #[must_use]
    pub fn with_on(mut self, is_on: bool) -> Self {
        self.is_on = Some(is_on);
        self
    }

    /// Sets the brightness.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets all three color channels.
    #[must_use]
    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.red = Some(color.red());
        self.green = Some(color.green());
        self.blue = Some(color.blue());
        self
    }

    /// Sets the language.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Sets the super-bright flag.
    #[must_use]
    pub fn with_super_bright(mut self, super_bright: bool) -> Self {
        self.super_bright = Some(super_bright);
        self
    }

    /// Sets the transition effect.
    #[must_use]
    pub fn with_transition_effect(mut self, effect: TransitionEffect) -> Self {
        self.transition_effect = Some(effect);
        self
    }

    /// Sets the prefix mode.
    #[must_use]
    pub fn with_prefix_mode(mut self, mode: PrefixMode) -> Self {
        self.prefix_mode = Some(mode);
        self
    }

    /// Sets the transition speed.
    #[must_use]
    pub fn with_transition_speed(mut self, speed: TransitionSpeed) -> Self {
        self.transition_speed = Some(speed);
        self
    }

    /// Returns `true` if the update carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of wire fields carried by this update.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            self.is_on.is_some(),
            self.brightness.is_some(),
            self.red.is_some(),
            self.green.is_some(),
            self.blue.is_some(),
            self.language.is_some(),
            self.super_bright.is_some(),
            self.transition_effect.is_some(),
            self.prefix_mode.is_some(),
            self.transition_speed.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Combines two updates; values present in `other` win.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        macro_rules! take_if_some {
            ($($field:ident),+) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )+
            };
        }

        take_if_some!(
            is_on,
            brightness,
            red,
            green,
            blue,
            language,
            super_bright,
            transition_effect,
            prefix_mode,
            transition_speed
        );
        self
    }

    /// Serializes the update into the device's JSON shape.
    ///
    /// Only present fields are emitted.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Decodes an update from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `FrameParseError::Json` if the text is not JSON, or
    /// `FrameParseError::NotAnObject` if it is not a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, FrameParseError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    /// Decodes an update from an already parsed JSON value.
    ///
    /// Unknown keys are ignored. Known keys carrying an invalid value are
    /// dropped and logged at debug level.
    ///
    /// # Errors
    ///
    /// Returns `FrameParseError::NotAnObject` if `value` is not an object.
    pub fn from_json_value(value: &Value) -> Result<Self, FrameParseError> {
        let object = value.as_object().ok_or(FrameParseError::NotAnObject)?;
        let mut update = Self::new();

        for (key, value) in object {
            let accepted = match key.as_str() {
                "enabled" => value.as_bool().map(|v| update.is_on = Some(v)),
                "brightness" => integer(value)
                    .and_then(|v| Brightness::try_from(v).ok())
                    .map(|v| update.brightness = Some(v)),
                "red" => channel(value).map(|v| update.red = Some(v)),
                "green" => channel(value).map(|v| update.green = Some(v)),
                "blue" => channel(value).map(|v| update.blue = Some(v)),
                "language" => value
                    .as_str()
                    .and_then(|v| v.parse::<Language>().ok())
                    .map(|v| update.language = Some(v)),
                "superBright" => value.as_bool().map(|v| update.super_bright = Some(v)),
                "transition" => integer(value)
                    .and_then(|v| TransitionEffect::from_code(v).ok())
                    .map(|v| update.transition_effect = Some(v)),
                "prefixMode" => integer(value)
                    .and_then(|v| PrefixMode::from_code(v).ok())
                    .map(|v| update.prefix_mode = Some(v)),
                "transitionSpeed" => integer(value)
                    .and_then(|v| TransitionSpeed::try_from(v).ok())
                    .map(|v| update.transition_speed = Some(v)),
                _ => {
                    tracing::trace!(key = %key, "Ignoring unknown field");
                    continue;
                }
            };

            if accepted.is_none() {
                tracing::debug!(key = %key, value = %value, "Dropping out-of-domain field");
            }
        }

        Ok(update)
    }
}

fn integer(value: &Value) -> Option<i64> {
    value.as_i64()
}

fn channel(value: &Value) -> Option<u8> {
    integer(value).and_then(|v| u8::try_from(v).ok())
}

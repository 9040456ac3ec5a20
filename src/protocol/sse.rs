// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental decoder for the `text/event-stream` push channel.
//!
//! The device sends frames shaped like:
//!
//! ```text
//! event: settings
//! data: {"red":255,"green":100,"blue":50,"brightness":80}
//!
//! ```
//!
//! Bytes arrive in arbitrary chunks, so the decoder buffers partial lines
//! between calls to [`SseDecoder::push`].

use crate::error::FrameParseError;
use crate::state::PartialStateUpdate;

/// Event name of frames carrying a settings delta.
pub const SETTINGS_EVENT: &str = "settings";

/// One complete push frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if the frame had one.
    pub event: Option<String>,
    /// Concatenated `data:` lines, joined with `\n`.
    pub data: String,
}

impl SseFrame {
    /// Returns `true` if this is a `settings` frame.
    #[must_use]
    pub fn is_settings(&self) -> bool {
        self.event.as_deref() == Some(SETTINGS_EVENT)
    }

    /// Decodes the frame payload as a settings delta.
    ///
    /// # Errors
    ///
    /// Returns `FrameParseError::MissingData` for a blank payload, or the
    /// JSON decoding error otherwise.
    pub fn decode(&self) -> Result<PartialStateUpdate, FrameParseError> {
        if self.data.trim().is_empty() {
            return Err(FrameParseError::MissingData);
        }
        PartialStateUpdate::from_json_str(&self.data)
    }
}

/// Line-oriented push frame decoder.
///
/// # Examples
///
/// ```
/// use wordclock_lib::protocol::SseDecoder;
///
/// let mut decoder = SseDecoder::new();
/// assert!(decoder.push(b"event: settings\r\ndata: {\"bright").is_empty());
///
/// let frames = decoder.push(b"ness\":80}\r\n\r\n");
/// assert_eq!(frames.len(), 1);
/// assert!(frames[0].is_settings());
/// assert_eq!(frames[0].data, r#"{"brightness":80}"#);
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes and returns every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            tracing::trace!(line = %line, "Event stream line");

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Discards any partially received frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.event = None;
        self.data.clear();
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.trim().to_string()),
            "data" => self.data.push(value.to_string()),
            _ => tracing::trace!(field = %field, "Ignoring event stream field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = self.data.join("\n");
        self.data.clear();
        Some(SseFrame { event, data })
    }
}

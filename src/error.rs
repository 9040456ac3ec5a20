// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `WordClock` library.
//!
//! The hierarchy mirrors the layers of the library: value validation,
//! request/response transport, push-frame decoding and subscriber dispatch.
//! None of the network errors are fatal to a running
//! [`Coordinator`](crate::Coordinator); they are reported and the stream
//! keeps reconnecting.

use thiserror::Error;

use crate::subscription::SubscriptionId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the device.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A push frame could not be decoded.
    #[error("frame error: {0}")]
    Frame(#[from] FrameParseError),

    /// The coordinator has been stopped.
    #[error("coordinator is stopped")]
    Stopped,

    /// A background update task ended without reporting a result.
    #[error("update task aborted: {0}")]
    UpdateAborted(String),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// An unknown language identifier was provided.
    #[error("invalid language: {0}")]
    InvalidLanguage(String),

    /// An unknown option label or code was provided for a select-style setting.
    #[error("invalid {kind} option: {value}")]
    InvalidOption {
        /// The setting the option belongs to.
        kind: &'static str,
        /// The rejected label or code.
        value: String,
    },
}

/// Errors raised by a single request/response call or by opening the
/// event stream.
///
/// Callers decide the retry policy: the coordinator treats a failed
/// status fetch as "no initial snapshot", the stream reader treats any
/// of these as a reconnect trigger.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP request failed at the network level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status code.
    #[error("HTTP {code} - {reason}")]
    Status {
        /// Numeric status code.
        code: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The request did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The response body was not a valid device payload.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The event stream ended.
    #[error("event stream closed")]
    StreamClosed,
}

impl TransportError {
    /// Maps a `reqwest` error, keeping timeouts distinguishable.
    pub(crate) fn from_request(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else {
            Self::Http(err)
        }
    }
}

/// Errors related to decoding a single push frame.
///
/// Always non-fatal: the frame is dropped and the stream continues.
#[derive(Debug, Error)]
pub enum FrameParseError {
    /// The `data:` payload is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// The frame carried no `data:` field.
    #[error("frame has no data")]
    MissingData,
}

/// A subscriber callback failed while being notified.
///
/// Failures are isolated per callback and only logged; they never reach
/// the code that triggered the notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("subscriber {id} failed: {message}")]
pub struct SubscriberError {
    /// The subscription whose callback failed.
    pub id: SubscriptionId,
    /// Panic payload or failure description.
    pub message: String,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

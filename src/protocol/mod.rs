// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol layer for communicating with WordClock devices.
//!
//! The device exposes three endpoints:
//!
//! - `GET /status` - full settings snapshot as JSON
//! - `POST /update` - partial settings write as JSON
//! - `GET /events` - `text/event-stream` push channel
//!
//! [`HttpClient`] implements them over `reqwest`. The [`Protocol`] trait is
//! the seam the [`Coordinator`](crate::Coordinator) talks to, so any other
//! transport (or an in-memory fake) can be plugged in.
//!
//! [`SseDecoder`] turns the raw push byte stream into frames, and
//! [`EventStreamReader`] owns the connect/stream/retry loop.

mod event_stream;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod sse;

pub use event_stream::{EventStreamReader, StreamSink};
pub use http::{HttpClient, HttpConfig};
pub use sse::{SETTINGS_EVENT, SseDecoder, SseFrame};

use std::future::Future;

use bytes::Bytes;
use futures_util::stream::BoxStream;

use crate::error::TransportError;
use crate::state::PartialStateUpdate;

/// Raw body of an open push connection.
///
/// Yields chunks as they arrive; the stream ending or yielding an error
/// means the connection dropped.
pub type EventStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Trait for transports that can talk to a WordClock device.
///
/// Implementations hold no device state of their own; every call is
/// independent and none of them retries internally.
pub trait Protocol: Send + Sync + 'static {
    /// Fetches the settings snapshot.
    ///
    /// Only the fields the device reported with a valid value are set in
    /// the returned update, so merging it never resets a setting the
    /// payload omitted.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the device is unreachable, answers with a
    /// non-success status, or sends a payload that is not a JSON object.
    fn fetch_status(
        &self,
    ) -> impl Future<Output = Result<PartialStateUpdate, TransportError>> + Send;

    /// Sends a partial settings write.
    ///
    /// Only the fields present in `update` are transmitted.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on network failure, timeout or a non-success
    /// status.
    fn send_update(
        &self,
        update: &PartialStateUpdate,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Opens the push channel.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the connection cannot be established or
    /// the device rejects it.
    fn open_event_stream(&self) -> impl Future<Output = Result<EventStream, TransportError>> + Send;
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event stream reader with constant-interval reconnect.
//!
//! The reader holds at most one push connection at a time. Its lifecycle is:
//!
//! ```text
//! Idle -> Connecting -> Streaming -> WaitingToRetry -> Connecting -> ...
//!                    \______________/
//!                     (open failed)
//! ```
//!
//! Any state can move to `Stopped` when the cancellation token fires. The
//! retry wait is fixed; it never grows and the loop never gives up on its
//! own. With an idle timeout set, a stream that stays silent for that long
//! counts as dropped.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::protocol::{EventStream, Protocol, SseDecoder, SseFrame};
use crate::state::{ConnectionStatus, PartialStateUpdate};

/// Consumer of everything the reader produces.
///
/// Calls arrive from the reader task, one at a time, in arrival order.
pub trait StreamSink: Send + Sync + 'static {
    /// A `settings` frame was decoded.
    fn on_stream_update(&self, update: PartialStateUpdate);

    /// The connection status changed.
    fn on_connection_status(&self, status: ConnectionStatus);
}

impl<T: StreamSink> StreamSink for Arc<T> {
    fn on_stream_update(&self, update: PartialStateUpdate) {
        (**self).on_stream_update(update);
    }

    fn on_connection_status(&self, status: ConnectionStatus) {
        (**self).on_connection_status(status);
    }
}

enum StreamEnd {
    Cancelled,
    Dropped(TransportError),
}

/// Owns the push connection and its retry timing.
pub struct EventStreamReader<P, S> {
    protocol: Arc<P>,
    sink: S,
    reconnect_delay: Duration,
    idle_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<P: Protocol, S: StreamSink> EventStreamReader<P, S> {
    /// Creates a reader in the `Idle` state.
    #[must_use]
    pub fn new(
        protocol: Arc<P>,
        sink: S,
        reconnect_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            protocol,
            sink,
            reconnect_delay,
            idle_timeout: None,
            cancel,
        }
    }

    /// Drops and reopens a stream that delivers nothing for `timeout`.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Runs the connect/stream/retry loop until the token is cancelled.
    ///
    /// In-flight connection attempts and pending retry waits are abandoned
    /// as soon as cancellation is requested.
    pub async fn run(self) {
        let delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(delay_ms, idle_timeout = ?self.idle_timeout, "Event stream reader started");

        let mut decoder = SseDecoder::new();
        loop {
            let opened = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.protocol.open_event_stream() => result,
            };

            match opened {
                Ok(stream) => {
                    tracing::info!("Event stream connected");
                    self.sink.on_connection_status(ConnectionStatus::Connected);

                    let end = self.stream_frames(stream, &mut decoder).await;
                    decoder.reset();
                    match end {
                        StreamEnd::Cancelled => break,
                        StreamEnd::Dropped(e) => {
                            tracing::warn!(error = %e, delay_ms, "Event stream dropped, reconnecting");
                            if self.cancel.is_cancelled() {
                                break;
                            }
                            self.sink.on_connection_status(ConnectionStatus::Disconnected);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, delay_ms, "Failed to open event stream, retrying");
                }
            }

            if self.cancel.is_cancelled() {
                break;
            }
            self.sink.on_connection_status(ConnectionStatus::Reconnecting);

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        tracing::debug!("Event stream reader stopped");
    }

    async fn stream_frames(&self, mut stream: EventStream, decoder: &mut SseDecoder) -> StreamEnd {
        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return StreamEnd::Cancelled,
                next = self.next_chunk(&mut stream) => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for frame in decoder.push(&chunk) {
                        self.handle_frame(&frame);
                    }
                }
                Some(Err(e)) => return StreamEnd::Dropped(e),
                None => return StreamEnd::Dropped(TransportError::StreamClosed),
            }
        }
    }

    async fn next_chunk(
        &self,
        stream: &mut EventStream,
    ) -> Option<Result<Bytes, TransportError>> {
        let Some(idle) = self.idle_timeout else {
            return stream.next().await;
        };
        match tokio::time::timeout(idle, stream.next()).await {
            Ok(next) => next,
            Err(_) => {
                let idle_ms = u64::try_from(idle.as_millis()).unwrap_or(u64::MAX);
                Some(Err(TransportError::Timeout(idle_ms)))
            }
        }
    }

    fn handle_frame(&self, frame: &SseFrame) {
        if !frame.is_settings() {
            tracing::debug!(event = ?frame.event, "Ignoring event");
            return;
        }

        match frame.decode() {
            Ok(update) => {
                tracing::debug!(fields = update.len(), "Received settings frame");
                self.sink.on_stream_update(update);
            }
            Err(e) => tracing::warn!(error = %e, data = %frame.data, "Dropping malformed frame"),
        }
    }
}

impl<P, S> std::fmt::Debug for EventStreamReader<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStreamReader")
            .field("reconnect_delay", &self.reconnect_delay)
            .field("idle_timeout", &self.idle_timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

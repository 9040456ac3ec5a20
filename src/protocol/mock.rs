// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device used by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::protocol::{EventStream, Protocol};
use crate::state::PartialStateUpdate;

/// Scripted device.
///
/// Each call to `open_event_stream` consumes one prepared stream; when none
/// are left the connection attempt fails.
pub(crate) struct MockProtocol {
    status: Mutex<Option<PartialStateUpdate>>,
    sent: Mutex<Vec<PartialStateUpdate>>,
    fail_updates: AtomicBool,
    streams: Mutex<VecDeque<mpsc::UnboundedReceiver<&'static str>>>,
    kept: Mutex<Vec<mpsc::UnboundedSender<&'static str>>>,
    attempts: Mutex<Vec<Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProtocol {
    pub(crate) fn new() -> Self {
        Self {
            status: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            fail_updates: AtomicBool::new(false),
            streams: Mutex::new(VecDeque::new()),
            kept: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Makes `fetch_status` succeed with `payload`.
    pub(crate) fn with_status(self, payload: PartialStateUpdate) -> Self {
        self.set_status(payload);
        self
    }

    /// Replaces the payload returned by later `fetch_status` calls.
    pub(crate) fn set_status(&self, payload: PartialStateUpdate) {
        *self.status.lock() = Some(payload);
    }

    pub(crate) fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Prepares a stream fed through the returned sender. Dropping the
    /// sender ends the stream.
    pub(crate) fn push_stream(&self) -> mpsc::UnboundedSender<&'static str> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.lock().push_back(rx);
        tx
    }

    /// Prepares a stream that stays open for the lifetime of the mock.
    pub(crate) fn push_stream_keep(&self) {
        let tx = self.push_stream();
        self.kept.lock().push(tx);
    }

    pub(crate) fn sent(&self) -> Vec<PartialStateUpdate> {
        self.sent.lock().clone()
    }

    pub(crate) fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Protocol for MockProtocol {
    async fn fetch_status(&self) -> Result<PartialStateUpdate, TransportError> {
        self.status.lock().clone().ok_or(TransportError::Status {
            code: 503,
            reason: "Service Unavailable".to_string(),
        })
    }

    async fn send_update(&self, update: &PartialStateUpdate) -> Result<(), TransportError> {
        self.sent.lock().push(update.clone());
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout(5000));
        }
        Ok(())
    }

    async fn open_event_stream(&self) -> Result<EventStream, TransportError> {
        self.attempts.lock().push(Instant::now());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let Some(rx) = self.streams.lock().pop_front() else {
            return Err(TransportError::Status {
                code: 503,
                reason: "Service Unavailable".to_string(),
            });
        };

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv()
                .await
                .map(|text| (Ok(Bytes::from_static(text.as_bytes())), rx))
        })
        .boxed())
    }
}

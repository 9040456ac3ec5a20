// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State owned by a coordinator and shared with its reader task.
//!
//! Every mutation goes through [`Shared::commit`]: the state is changed and
//! a snapshot is queued under one lock, then a single dispatcher drains the
//! queue with the lock released. Subscribers therefore see snapshots in
//! commit order, never a half-applied change, and may call back into the
//! coordinator from inside a notification.

use std::collections::VecDeque;

use parking_lot::{Mutex, MutexGuard};

use crate::protocol::StreamSink;
use crate::state::{ConnectionStatus, DeviceState, PartialStateUpdate, StateSnapshot, UpdateOrigin};
use crate::subscription::SubscriberRegistry;

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) state: DeviceState,
    pub(crate) status: ConnectionStatus,
    pub(crate) has_data: bool,
    pub(crate) stopped: bool,
    sequence: u64,
    queue: VecDeque<StateSnapshot>,
    dispatching: bool,
}

impl Inner {
    fn merge(&mut self, update: &PartialStateUpdate, origin: UpdateOrigin) {
        let changed = self.state.apply(update);
        self.has_data = true;
        tracing::debug!(?origin, changed, fields = update.len(), "Merged update");
    }
}

#[derive(Debug, Default)]
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    pub(crate) registry: SubscriberRegistry,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    /// Applies `mutate` and notifies subscribers.
    ///
    /// `mutate` returns `false` to skip the notification. Nothing happens
    /// once the coordinator is stopped. Returns whether a snapshot was
    /// committed.
    pub(crate) fn commit<F>(&self, origin: UpdateOrigin, mutate: F) -> bool
    where
        F: FnOnce(&mut Inner) -> bool,
    {
        let mut inner = self.inner.lock();
        if inner.stopped || !mutate(&mut inner) {
            return false;
        }

        inner.sequence += 1;
        let snapshot = StateSnapshot {
            state: inner.state.clone(),
            status: inner.status,
            origin,
            sequence: inner.sequence,
        };
        inner.queue.push_back(snapshot);

        // Another caller (or an outer frame of this one) is already draining
        if inner.dispatching {
            return true;
        }

        inner.dispatching = true;
        while let Some(snapshot) = inner.queue.pop_front() {
            MutexGuard::unlocked(&mut inner, || {
                self.registry.notify(&snapshot);
            });
        }
        inner.dispatching = false;
        true
    }

    /// Marks the coordinator stopped and drops undelivered snapshots.
    ///
    /// Returns `false` if it was already stopped.
    pub(crate) fn shut_down(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return false;
        }
        inner.stopped = true;
        inner.queue.clear();
        true
    }

    pub(crate) fn merge(&self, update: &PartialStateUpdate, origin: UpdateOrigin) -> bool {
        self.commit(origin, |inner| {
            inner.merge(update, origin);
            true
        })
    }

    /// Merges a status payload, optionally moving to `status` in the same
    /// commit.
    pub(crate) fn merge_snapshot(
        &self,
        update: &PartialStateUpdate,
        status: Option<ConnectionStatus>,
    ) -> bool {
        self.commit(UpdateOrigin::Snapshot, |inner| {
            inner.merge(update, UpdateOrigin::Snapshot);
            if let Some(status) = status {
                inner.status = status;
            }
            true
        })
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) -> bool {
        self.commit(UpdateOrigin::Connection, |inner| {
            if inner.status == status {
                return false;
            }
            tracing::debug!(from = %inner.status, to = %status, "Connection status changed");
            inner.status = status;
            true
        })
    }
}

impl StreamSink for Shared {
    fn on_stream_update(&self, update: PartialStateUpdate) {
        self.merge(&update, UpdateOrigin::Device);
    }

    fn on_connection_status(&self, status: ConnectionStatus) {
        self.set_status(status);
    }
}

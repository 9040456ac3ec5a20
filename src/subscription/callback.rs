// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for state subscriptions.
//!
//! This module provides the core types for managing subscribers:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`Subscriber`] - Trait for objects registered by weak reference
//! - [`SubscriberRegistry`] - Registry storing callbacks and dispatching snapshots

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::SubscriberError;
use crate::state::StateSnapshot;

/// Unique identifier for a subscription.
///
/// Returned when registering a subscriber and used to unsubscribe later.
/// IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// An object that wants to observe state changes without being kept alive
/// by the registry.
///
/// Register it with [`SubscriberRegistry::subscribe_weak`]; once the last
/// `Arc` to it is dropped the registry forgets it on the next notification.
pub trait Subscriber: Send + Sync {
    /// Called with every committed change.
    fn on_notify(&self, snapshot: &StateSnapshot);
}

type Callback = Arc<dyn Fn(&StateSnapshot) + Send + Sync>;

enum Entry {
    Callback(Callback),
    Weak(Weak<dyn Subscriber>),
}

enum Target {
    Callback(Callback),
    Subscriber(Arc<dyn Subscriber>),
}

impl Target {
    fn call(&self, snapshot: &StateSnapshot) {
        match self {
            Self::Callback(callback) => callback(snapshot),
            Self::Subscriber(subscriber) => subscriber.on_notify(snapshot),
        }
    }
}

/// Registry of subscribers for one coordinator.
///
/// Thread-safe through `parking_lot::RwLock`. The lock is never held while a
/// callback runs, so callbacks may subscribe or unsubscribe (including
/// themselves) without deadlocking.
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: RwLock<HashMap<SubscriptionId, Entry>>,
}

impl SubscriberRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback invoked with every snapshot.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.entries
            .write()
            .insert(id, Entry::Callback(Arc::new(callback)));
        id
    }

    /// Registers a subscriber by weak reference.
    pub fn subscribe_weak<S>(&self, subscriber: &Arc<S>) -> SubscriptionId
    where
        S: Subscriber + 'static,
    {
        let weak: Weak<dyn Subscriber> = Arc::downgrade(subscriber) as Weak<dyn Subscriber>;
        let id = self.next_id();
        self.entries.write().insert(id, Entry::Weak(weak));
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `true` if it was registered. Removing an unknown or already
    /// removed ID is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.entries.write().remove(&id).is_some()
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Delivers a snapshot to every currently registered subscriber.
    ///
    /// A callback that panics is logged and skipped; remaining subscribers
    /// still receive the snapshot. Returns the number of subscribers that
    /// handled it without failing.
    pub fn notify(&self, snapshot: &StateSnapshot) -> usize {
        let mut dead = Vec::new();
        let targets: Vec<(SubscriptionId, Target)> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter_map(|(id, entry)| match entry {
                    Entry::Callback(callback) => Some((*id, Target::Callback(Arc::clone(callback)))),
                    Entry::Weak(weak) => {
                        if let Some(subscriber) = weak.upgrade() {
                            Some((*id, Target::Subscriber(subscriber)))
                        } else {
                            dead.push(*id);
                            None
                        }
                    }
                })
                .collect()
        };

        if !dead.is_empty() {
            let mut entries = self.entries.write();
            for id in &dead {
                entries.remove(id);
            }
            tracing::debug!(count = dead.len(), "Pruned dropped subscribers");
        }

        let mut delivered = 0;
        for (id, target) in targets {
            match catch_unwind(AssertUnwindSafe(|| target.call(snapshot))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    let error = SubscriberError {
                        id,
                        message: panic_message(payload.as_ref()),
                    };
                    tracing::warn!(error = %error, "Subscriber failed, continuing");
                }
            }
        }
        delivered
    }

    /// Returns the number of registered subscriptions.
    ///
    /// Weak subscriptions whose target was dropped are counted until the
    /// next notification prunes them.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if there are no registered subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscriber_count", &self.len())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that publish state snapshots.

use std::sync::Arc;

use crate::state::{ConnectionStatus, DeviceState, StateSnapshot, UpdateOrigin};
use crate::subscription::{Subscriber, SubscriptionId};

/// Trait for types that support state subscriptions.
///
/// Only [`subscribe`](Self::subscribe), [`subscribe_weak`](Self::subscribe_weak)
/// and [`unsubscribe`](Self::unsubscribe) must be implemented; the filtered
/// helpers are built on top of them.
///
/// # Examples
///
/// ```no_run
/// use wordclock_lib::Coordinator;
/// use wordclock_lib::subscription::Subscribable;
///
/// # async fn example() -> wordclock_lib::Result<()> {
/// let clock = Coordinator::http("192.168.1.60").build()?;
///
/// // Every committed change, including connection transitions
/// let sub_id = clock.subscribe(|snapshot| {
///     println!("#{} {:?}: {:?}", snapshot.sequence, snapshot.origin, snapshot.state);
/// });
///
/// // Only link status transitions
/// clock.on_connection_changed(|status| println!("link is {status}"));
///
/// clock.start().await?;
/// clock.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to every committed change.
    ///
    /// The callback receives a snapshot of the whole state, so it never
    /// needs to call back into the publisher to read it.
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static;

    /// Subscribes an object without keeping it alive.
    fn subscribe_weak<S>(&self, subscriber: &Arc<S>) -> SubscriptionId
    where
        S: Subscriber + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Subscribes to device state changes.
    ///
    /// Connection-only transitions are filtered out.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.subscribe(move |snapshot| {
            if snapshot.origin != UpdateOrigin::Connection {
                callback(&snapshot.state);
            }
        })
    }

    /// Subscribes to connection status transitions.
    fn on_connection_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.subscribe(move |snapshot| {
            if snapshot.origin == UpdateOrigin::Connection {
                callback(snapshot.status);
            }
        })
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for clock state changes.
//!
//! # Overview
//!
//! The subscription system consists of:
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`SubscriberRegistry`] - Registry that stores subscribers and dispatches snapshots
//! - [`Subscriber`] - Trait for objects registered by weak reference
//! - [`Subscribable`] - Trait for types that publish snapshots
//!
//! # Delivery guarantees
//!
//! Subscribers receive a [`StateSnapshot`](crate::state::StateSnapshot) per
//! committed change, in commit order. No lock is held while a subscriber
//! runs, and a subscriber that panics does not prevent delivery to the
//! others.

mod callback;
mod subscribable;

pub use callback::{SubscriberRegistry, Subscriber, SubscriptionId};
pub use subscribable::Subscribable;

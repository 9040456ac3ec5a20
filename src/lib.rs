// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `WordClock` Lib - keeps a WordClock's settings in sync over HTTP.
//!
//! The clock exposes its settings (color, brightness, language, animation
//! options) through a small HTTP API and pushes changes over a
//! `text/event-stream` channel. This library holds a local copy of those
//! settings, keeps it current, and tells interested parties when it
//! changes.
//!
//! # Features
//!
//! - **Initial snapshot**: `GET /status` on start, optional on-demand refresh
//! - **Push updates**: long-lived event stream with a constant 5 s reconnect
//! - **Optimistic writes**: local state changes immediately, `POST /update`
//!   runs in the background
//! - **Subscriptions**: callbacks or weakly held subscribers, isolated from
//!   each other's failures
//!
//! # Quick Start
//!
//! ```no_run
//! use wordclock_lib::{Coordinator, PartialStateUpdate};
//! use wordclock_lib::subscription::Subscribable;
//! use wordclock_lib::types::{Brightness, RgbColor};
//!
//! #[tokio::main]
//! async fn main() -> wordclock_lib::Result<()> {
//!     let clock = Coordinator::http("192.168.1.60").build()?;
//!
//!     clock.subscribe(|snapshot| {
//!         println!("[{}] {:?}", snapshot.status, snapshot.state);
//!     });
//!
//!     clock.start().await?;
//!
//!     let update = PartialStateUpdate::new()
//!         .with_brightness(Brightness::new(200)?)
//!         .with_color(RgbColor::new(255, 120, 0));
//!     clock.apply(update)?.wait().await?;
//!
//!     clock.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber in the
//! host application to see them. The reader task runs inside an
//! `event_stream` span carrying the clock's name.

mod coordinator;
pub mod error;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use coordinator::{Coordinator, HttpCoordinatorBuilder, UpdateHandle};
pub use error::{
    Error, FrameParseError, Result, SubscriberError, TransportError, ValueError,
};
pub use protocol::{HttpClient, HttpConfig, Protocol};
pub use state::{ConnectionStatus, DeviceState, PartialStateUpdate, StateSnapshot, UpdateOrigin};
pub use subscription::{Subscribable, Subscriber, SubscriptionId};
pub use types::{Brightness, Language, PrefixMode, RgbColor, TransitionEffect, TransitionSpeed};

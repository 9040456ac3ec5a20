// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State coordinator for a single WordClock.
//!
//! The [`Coordinator`] owns the only copy of the device state. Three sources
//! feed it:
//!
//! - the initial (and any on-demand) status fetch,
//! - push frames delivered by the event stream reader,
//! - optimistic writes made through [`Coordinator::apply`].
//!
//! All of them are merged per field, last write wins, and every committed
//! change is delivered to subscribers as a [`StateSnapshot`].
//!
//! # Examples
//!
//! ```no_run
//! use wordclock_lib::Coordinator;
//! use wordclock_lib::state::PartialStateUpdate;
//! use wordclock_lib::subscription::Subscribable;
//! use wordclock_lib::types::Brightness;
//!
//! # async fn example() -> wordclock_lib::Result<()> {
//! let clock = Coordinator::http("192.168.1.60")
//!     .with_name("Living room")
//!     .build()?;
//!
//! clock.on_state_changed(|state| println!("brightness: {}", state.brightness()));
//! clock.start().await?;
//!
//! // Applied locally right away, sent to the device in the background
//! let pending = clock.apply(PartialStateUpdate::new().with_brightness(Brightness::new(80)?))?;
//! pending.wait().await?;
//!
//! clock.stop().await;
//! # Ok(())
//! # }
//! ```

mod http_builder;
mod shared;

pub use http_builder::HttpCoordinatorBuilder;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::{Error, TransportError};
use crate::protocol::{EventStreamReader, HttpConfig, Protocol};
use crate::state::{ConnectionStatus, DeviceState, PartialStateUpdate, StateSnapshot, UpdateOrigin};
use crate::subscription::{Subscribable, Subscriber, SubscriptionId};

use shared::Shared;

/// Keeps a WordClock's settings in sync and fans changes out to subscribers.
///
/// Create one per device and share it by reference (or `Arc`) with every
/// consumer.
pub struct Coordinator<P: Protocol> {
    protocol: Arc<P>,
    shared: Arc<Shared>,
    name: String,
    reconnect_delay: Duration,
    idle_timeout: Option<Duration>,
    cancel: CancellationToken,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator<crate::protocol::HttpClient> {
    /// Creates a builder for a device reachable over HTTP.
    #[must_use]
    pub fn http(host: impl Into<String>) -> HttpCoordinatorBuilder {
        HttpCoordinatorBuilder::new(HttpConfig::new(host))
    }

    /// Creates a builder from a full HTTP configuration.
    #[must_use]
    pub fn http_config(config: HttpConfig) -> HttpCoordinatorBuilder {
        HttpCoordinatorBuilder::new(config)
    }
}

impl<P: Protocol> Coordinator<P> {
    /// Creates a coordinator over an arbitrary transport.
    ///
    /// State starts at the device defaults with status
    /// [`ConnectionStatus::Connecting`]; nothing touches the network until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(protocol: P) -> Self {
        Self {
            protocol: Arc::new(protocol),
            shared: Arc::new(Shared::new()),
            name: "wordclock".to_string(),
            reconnect_delay: HttpConfig::DEFAULT_RECONNECT_DELAY,
            idle_timeout: None,
            cancel: CancellationToken::new(),
            reader: Mutex::new(None),
        }
    }

    /// Sets the friendly name used in log output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the wait between event stream connection attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Reopens the event stream after `timeout` without any bytes.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Returns the friendly name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Fetches the initial snapshot and starts the event stream reader.
    ///
    /// A failed fetch is not an error: the state stays at its defaults, the
    /// status becomes [`ConnectionStatus::Disconnected`], and the reader is
    /// started anyway. After a successful fetch the status is
    /// [`ConnectionStatus::Connecting`] until the stream opens. Calling
    /// `start` on a running coordinator does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stopped`] if the coordinator has been stopped.
    pub async fn start(&self) -> Result<(), Error> {
        self.ensure_running()?;
        if self.reader.lock().is_some() {
            tracing::debug!(name = %self.name, "Coordinator already started");
            return Ok(());
        }

        tracing::info!(name = %self.name, "Starting coordinator");

        match self.protocol.fetch_status().await {
            Ok(update) => {
                self.shared
                    .merge_snapshot(&update, Some(ConnectionStatus::Connecting));
            }
            Err(e) => {
                tracing::warn!(name = %self.name, error = %e, "Initial status fetch failed");
                self.shared.set_status(ConnectionStatus::Disconnected);
            }
        }

        let mut slot = self.reader.lock();
        if slot.is_some() {
            return Ok(());
        }
        self.ensure_running()?;

        let reader = EventStreamReader::new(
            Arc::clone(&self.protocol),
            Arc::clone(&self.shared),
            self.reconnect_delay,
            self.cancel.clone(),
        )
        .with_idle_timeout(self.idle_timeout);
        let span = tracing::info_span!("event_stream", name = %self.name);
        *slot = Some(tokio::spawn(reader.run().instrument(span)));
        Ok(())
    }

    /// Stops the reader and releases every subscriber.
    ///
    /// Safe to call at any time, including while a connection attempt or a
    /// retry wait is pending; neither is waited out. No notification is
    /// delivered once this returns. Calling it again does nothing.
    pub async fn stop(&self) {
        if !self.shared.shut_down() {
            return;
        }
        self.cancel.cancel();

        let reader = self.reader.lock().take();
        if let Some(handle) = reader
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            tracing::warn!(name = %self.name, error = %e, "Event stream task failed");
        }

        self.shared.registry.clear();
        tracing::info!(name = %self.name, "Coordinator stopped");
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    fn ensure_running(&self) -> Result<(), Error> {
        if self.is_stopped() {
            Err(Error::Stopped)
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // State access
    // ========================================================================

    /// Returns a copy of the current state.
    #[must_use]
    pub fn get_state(&self) -> DeviceState {
        self.shared.lock().state.clone()
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.lock().status
    }

    /// Returns `true` once any snapshot, frame or local write has populated
    /// the state.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.shared.lock().has_data
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Applies a user change optimistically and sends it to the device.
    ///
    /// The update is merged and committed before this returns, and the
    /// write then runs in the background. Subscribers are normally notified
    /// before this returns too; if another thread is delivering
    /// notifications at that moment, this snapshot is queued behind the
    /// ones already committed and that thread delivers it instead. A failed write is
    /// logged and reported through the returned handle, but the local state
    /// is not rolled back: the next push frame or status poll corrects any
    /// divergence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stopped`] if the coordinator has been stopped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn apply(&self, update: PartialStateUpdate) -> Result<UpdateHandle, Error> {
        if !self.shared.merge(&update, UpdateOrigin::Local) {
            return Err(Error::Stopped);
        }

        let protocol = Arc::clone(&self.protocol);
        let name = self.name.clone();
        let task = tokio::spawn(async move {
            let result = protocol.send_update(&update).await;
            if let Err(e) = &result {
                tracing::warn!(name = %name, error = %e, "Failed to send update");
            }
            result
        });

        Ok(UpdateHandle { task })
    }

    /// Merges a decoded push frame as confirmed device state.
    pub fn on_stream_update(&self, update: &PartialStateUpdate) {
        self.shared.merge(update, UpdateOrigin::Device);
    }

    /// Publishes a connection status transition.
    ///
    /// Device state is not touched. Repeating the current status is a no-op.
    pub fn on_connection_status(&self, status: ConnectionStatus) {
        self.shared.set_status(status);
    }

    /// Polls the device for a status snapshot and merges it.
    ///
    /// Fields missing from the payload, or carrying an invalid value, keep
    /// their current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stopped`] if the coordinator has been stopped, or
    /// [`Error::Transport`] if the fetch fails; the state is left untouched
    /// in that case.
    pub async fn refresh(&self) -> Result<DeviceState, Error> {
        self.ensure_running()?;
        let update = self
            .protocol
            .fetch_status()
            .await
            .inspect_err(|e| {
                tracing::warn!(name = %self.name, error = %e, "Status refresh failed");
            })?;

        if !self.shared.merge_snapshot(&update, None) {
            return Err(Error::Stopped);
        }
        Ok(self.get_state())
    }
}

impl<P: Protocol> Subscribable for Coordinator<P> {
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(callback)
    }

    fn subscribe_weak<S>(&self, subscriber: &Arc<S>) -> SubscriptionId
    where
        S: Subscriber + 'static,
    {
        self.shared.registry.subscribe_weak(subscriber)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.registry.unsubscribe(id)
    }
}

impl<P: Protocol> Drop for Coordinator<P> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<P: Protocol> std::fmt::Debug for Coordinator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("name", &self.name)
            .field("status", &self.connection_status())
            .field("reconnect_delay", &self.reconnect_delay)
            .field("idle_timeout", &self.idle_timeout)
            .field("subscribers", &self.shared.registry.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// UpdateHandle
// ============================================================================

/// Completion of a background write started by [`Coordinator::apply`].
///
/// Dropping the handle does not cancel the write.
#[derive(Debug)]
pub struct UpdateHandle {
    task: JoinHandle<Result<(), TransportError>>,
}

impl UpdateHandle {
    /// Waits for the device to acknowledge the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the write failed, or
    /// [`Error::UpdateAborted`] if the task was cancelled before finishing.
    pub async fn wait(self) -> Result<(), Error> {
        match self.task.await {
            Ok(result) => result.map_err(Error::from),
            Err(e) => Err(Error::UpdateAborted(e.to_string())),
        }
    }

    /// Returns `true` if the write has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP coordinator builder.

use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::error::Error;
use crate::protocol::{HttpClient, HttpConfig};

/// Builder for coordinators talking to a device over HTTP.
///
/// This builder can be created in two ways:
/// - `Coordinator::http("host")` - Simple host string
/// - `Coordinator::http_config(HttpConfig::new("host").with_port(8080))` - Advanced configuration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wordclock_lib::Coordinator;
///
/// # fn example() -> wordclock_lib::Result<()> {
/// let clock = Coordinator::http("192.168.1.60")
///     .with_name("Bedroom")
///     .with_reconnect_delay(Duration::from_secs(2))
///     .build()?;
///
/// assert_eq!(clock.name(), "Bedroom");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct HttpCoordinatorBuilder {
    config: HttpConfig,
}

impl HttpCoordinatorBuilder {
    /// Creates a new builder with the specified HTTP configuration.
    pub(crate) fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the friendly name used in log output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    /// Sets the timeout for status and update requests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets the wait between event stream connection attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_reconnect_delay(delay);
        self
    }

    /// Treats an event stream that stays silent for `timeout` as dropped.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_idle_timeout(timeout);
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Builds the coordinator.
    ///
    /// No network access happens here; call
    /// [`Coordinator::start`] to fetch the initial state and open the
    /// event stream.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<Coordinator<HttpClient>, Error> {
        let name = self.config.name().to_string();
        let reconnect_delay = self.config.reconnect_delay();
        let idle_timeout = self.config.idle_timeout();
        let client = self.config.into_client()?;

        Ok(Coordinator::new(client)
            .with_name(name)
            .with_reconnect_delay(reconnect_delay)
            .with_idle_timeout(idle_timeout))
    }
}

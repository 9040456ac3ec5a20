// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP protocol implementation for WordClock devices.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Response};

use crate::error::TransportError;
use crate::protocol::{EventStream, Protocol};
use crate::state::PartialStateUpdate;

// ============================================================================
// HttpConfig - Connection configuration for a WordClock
// ============================================================================

/// Configuration for an HTTP WordClock device.
///
/// The device speaks plaintext HTTP on the local network; there is no
/// TLS and no authentication.
///
/// # Examples
///
/// ```
/// use wordclock_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.60");
///
/// // With all options
/// let config = HttpConfig::new("wordclock.local")
///     .with_port(8080)
///     .with_name("Living room")
///     .with_timeout(Duration::from_secs(3))
///     .with_reconnect_delay(Duration::from_secs(2));
///
/// assert_eq!(config.base_url().unwrap(), "http://wordclock.local:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: Option<u16>,
    name: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    reconnect_delay: Duration,
    tcp_keepalive: Duration,
    idle_timeout: Option<Duration>,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default timeout for status and update requests.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default TCP connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default wait between event stream connection attempts.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
    /// Default interval for TCP keepalive probes on idle connections.
    pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Creates a new HTTP configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - Hostname or IP address, optionally with an `http://`
    ///   prefix and a `:port` suffix
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            name: None,
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
            tcp_keepalive: Self::DEFAULT_TCP_KEEPALIVE,
            idle_timeout: None,
        }
    }

    /// Sets a custom port, overriding any port given in the host.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the friendly name used in log output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the timeout for status and update requests.
    ///
    /// The event stream handshake is bounded by the same timeout; the
    /// stream body is long-lived and is not.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the TCP connect timeout, applied to every request.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the wait between event stream connection attempts.
    ///
    /// The delay is constant; it does not grow with repeated failures.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the TCP keepalive interval.
    ///
    /// A peer that vanished without closing the connection then surfaces
    /// as a dropped event stream instead of a silent one.
    #[must_use]
    pub fn with_tcp_keepalive(mut self, interval: Duration) -> Self {
        self.tcp_keepalive = interval;
        self
    }

    /// Treats an event stream that delivers no bytes for `timeout` as
    /// dropped.
    ///
    /// Off by default: the device only pushes when a setting changes, so a
    /// healthy stream may stay quiet for a long time.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Returns the host as given.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the explicitly configured port, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the friendly name, falling back to the host.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.host)
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Returns the TCP keepalive interval.
    #[must_use]
    pub fn tcp_keepalive(&self) -> Duration {
        self.tcp_keepalive
    }

    /// Returns the event stream idle timeout, if one is set.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Builds the base URL from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidAddress` if the host is empty,
    /// carries a path, or uses a scheme other than `http`.
    pub fn base_url(&self) -> Result<String, TransportError> {
        let host = self.host.trim().trim_end_matches('/');
        let host = match host.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
            Some((scheme, _)) => {
                return Err(TransportError::InvalidAddress(format!(
                    "unsupported scheme '{scheme}'"
                )));
            }
            None => host,
        };

        if host.is_empty() {
            return Err(TransportError::InvalidAddress("host is required".to_string()));
        }
        if host.contains('/') {
            return Err(TransportError::InvalidAddress(format!(
                "unexpected path in host '{host}'"
            )));
        }

        let (bare_host, host_port) = match host.rsplit_once(':') {
            Some((bare, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    TransportError::InvalidAddress(format!("invalid port in '{host}'"))
                })?;
                (bare, Some(port))
            }
            None => (host, None),
        };

        let port = self.port.or(host_port).unwrap_or(Self::DEFAULT_PORT);
        if port == Self::DEFAULT_PORT {
            Ok(format!("http://{bare_host}"))
        } else {
            Ok(format!("http://{bare_host}:{port}"))
        }
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpClient, TransportError> {
        let base_url = self.base_url()?;

        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .tcp_keepalive(self.tcp_keepalive)
            .build()
            .map_err(TransportError::Http)?;

        Ok(HttpClient {
            base_url,
            client,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpClient - Device client over reqwest
// ============================================================================

/// HTTP client for communicating with a WordClock.
///
/// Stateless: every method issues one independent request and never
/// retries.
///
/// # Examples
///
/// ```no_run
/// use wordclock_lib::protocol::{HttpClient, Protocol};
///
/// # async fn example() -> wordclock_lib::Result<()> {
/// let client = HttpClient::new("192.168.1.60")?;
/// let status = client.fetch_status().await?;
/// println!("brightness is {:?}", status.brightness);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client for the specified host with default
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the HTTP client cannot be
    /// created.
    pub fn new(host: impl Into<String>) -> Result<Self, TransportError> {
        HttpConfig::new(host).into_client()
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn request_error(&self, err: reqwest::Error) -> TransportError {
        TransportError::from_request(err, self.timeout_ms())
    }
}

fn check_status(response: &Response) -> Result<(), TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        code: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

impl Protocol for HttpClient {
    async fn fetch_status(&self) -> Result<PartialStateUpdate, TransportError> {
        let url = self.url("status");

        tracing::debug!(url = %url, "Fetching device status");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        check_status(&response)?;

        let body = response.text().await.map_err(|e| self.request_error(e))?;

        tracing::debug!(body = %body, "Received device status");

        PartialStateUpdate::from_json_str(&body)
            .map_err(|e| TransportError::MalformedPayload(e.to_string()))
    }

    async fn send_update(&self, update: &PartialStateUpdate) -> Result<(), TransportError> {
        let url = self.url("update");

        tracing::debug!(url = %url, body = %update.to_json(), "Sending update");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(update)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        check_status(&response)
    }

    async fn open_event_stream(&self) -> Result<EventStream, TransportError> {
        let url = self.url("events");

        tracing::debug!(url = %url, "Opening event stream");

        // A per-request timeout would also cut the body, so only the
        // handshake is bounded here
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_ms()))?
            .map_err(|e| self.request_error(e))?;

        check_status(&response)?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::Http))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.60");
        assert_eq!(config.host(), "192.168.1.60");
        assert_eq!(config.port(), None);
        assert_eq!(config.name(), "192.168.1.60");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.tcp_keepalive(), Duration::from_secs(30));
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn http_config_builder_chain() {
        let config = HttpConfig::new("192.168.1.60")
            .with_port(8080)
            .with_name("Kitchen")
            .with_timeout(Duration::from_secs(2))
            .with_connect_timeout(Duration::from_secs(1))
            .with_reconnect_delay(Duration::from_millis(500))
            .with_tcp_keepalive(Duration::from_secs(10))
            .with_idle_timeout(Duration::from_secs(120));

        assert_eq!(config.port(), Some(8080));
        assert_eq!(config.name(), "Kitchen");
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.reconnect_delay(), Duration::from_millis(500));
        assert_eq!(config.tcp_keepalive(), Duration::from_secs(10));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn base_url_plain_host() {
        let config = HttpConfig::new("192.168.1.60");
        assert_eq!(config.base_url().unwrap(), "http://192.168.1.60");
    }

    #[test]
    fn base_url_custom_port() {
        let config = HttpConfig::new("192.168.1.60").with_port(8080);
        assert_eq!(config.base_url().unwrap(), "http://192.168.1.60:8080");
    }

    #[test]
    fn base_url_accepts_scheme_and_port_in_host() {
        let config = HttpConfig::new("http://wordclock.local:81/");
        assert_eq!(config.base_url().unwrap(), "http://wordclock.local:81");
    }

    #[test]
    fn base_url_explicit_port_wins() {
        let config = HttpConfig::new("wordclock.local:81").with_port(82);
        assert_eq!(config.base_url().unwrap(), "http://wordclock.local:82");
    }

    #[test]
    fn base_url_rejects_https() {
        let result = HttpConfig::new("https://192.168.1.60").base_url();
        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn base_url_rejects_empty_and_paths() {
        assert!(HttpConfig::new("").base_url().is_err());
        assert!(HttpConfig::new("http://").base_url().is_err());
        assert!(HttpConfig::new("192.168.1.60/api").base_url().is_err());
        assert!(HttpConfig::new("192.168.1.60:http").base_url().is_err());
    }

    #[test]
    fn http_config_into_client() {
        let client = HttpConfig::new("192.168.1.60")
            .with_timeout(Duration::from_secs(3))
            .into_client()
            .unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.60");
        assert_eq!(client.timeout(), Duration::from_secs(3));
        assert_eq!(client.url("status"), "http://192.168.1.60/status");
    }

    #[test]
    fn client_new_rejects_invalid_address() {
        assert!(HttpClient::new("ftp://192.168.1.60").is_err());
    }
}

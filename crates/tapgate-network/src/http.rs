//! HTTP transport for the decision service.
//!
//! This module provides the production [`Transport`]: a thin wrapper over a
//! reused `reqwest::Client` that resolves paths against the configured base
//! URL and returns raw status/body pairs for the wire layer to decode.
//!
//! # Architecture
//!
//! ```text
//! MainLoop
//!     │
//!     ├─> AuthorizationClient ──┐
//!     │                         ├─> HttpTransport ───(HTTP)───> Decision Service
//!     └─> AlarmStatePoller ─────┘        │
//!                                        └─> LinkStatus (association gate)
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: a failed tap is final; the cardholder re-presents
//! - **One client, many requests**: connection pooling comes from `reqwest`
//! - **Transport-level timeout only**: the endpoint never cancels an exchange
//!
//! # Example Usage
//!
//! ```no_run
//! use tapgate_network::{HttpTransport, HttpTransportConfig, LinkStatus, Transport};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpTransportConfig {
//!     base_url: "http://192.168.137.1:5000/api".to_string(),
//!     timeout: Duration::from_millis(5000),
//! };
//!
//! let transport = HttpTransport::new(config, LinkStatus::new(true))?;
//! let reply = transport.get("/hw_status").await?;
//! println!("status {}: {}", reply.status, reply.body);
//! # Ok(())
//! # }
//! ```

use crate::error::{ExchangeError, ExchangeResult};
use crate::transport::{HttpReply, LinkStatus, Transport};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tapgate_core::constants::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS};
use tracing::{debug, trace, warn};

/// Configuration for the HTTP transport
///
/// # Example
///
/// ```
/// use tapgate_network::HttpTransportConfig;
/// use std::time::Duration;
///
/// let config = HttpTransportConfig {
///     base_url: "http://127.0.0.1:5000/api".to_string(),
///     timeout: Duration::from_millis(2000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL every path is appended to
    pub base_url: String,

    /// Timeout for a whole request (connect, send, receive body)
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

/// HTTP implementation of [`Transport`].
///
/// Cloning is cheap and clones share the connection pool and link flag, so
/// the authorization client and the alarm poller each hold their own clone.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    link: LinkStatus,
}

impl HttpTransport {
    /// Create a new transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g. TLS backend initialization failure).
    pub fn new(config: HttpTransportConfig, link: LinkStatus) -> reqwest::Result<Self> {
        debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Creating HTTP transport"
        );

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            link,
        })
    }

    /// Link flag gating this transport.
    pub fn link(&self) -> &LinkStatus {
        &self.link
    }

    /// Absolute URL for a service path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ExchangeResult<HttpReply> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            ExchangeError::connection(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read response body: {}", e);
            ExchangeError::connection(e.to_string())
        })?;

        trace!(status, body_len = body.len(), "Received reply");
        Ok(HttpReply { status, body })
    }
}

impl Transport for HttpTransport {
    fn is_connected(&self) -> bool {
        self.link.is_up()
    }

    async fn get(&self, path: &str) -> ExchangeResult<HttpReply> {
        let url = self.url(path);
        trace!(%url, "GET");
        self.execute(self.client.get(url)).await
    }

    async fn post_json(&self, path: &str, body: String) -> ExchangeResult<HttpReply> {
        let url = self.url(path);
        trace!(%url, %body, "POST");
        self.execute(
            self.client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.base_url, "http://192.168.137.1:5000/api");
        assert_eq!(config.timeout.as_millis(), 5000);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = HttpTransportConfig {
            base_url: "http://127.0.0.1:5000/api/".to_string(),
            timeout: Duration::from_millis(100),
        };
        let transport = HttpTransport::new(config, LinkStatus::default()).unwrap();

        assert_eq!(transport.url("/tap"), "http://127.0.0.1:5000/api/tap");
    }

    #[test]
    fn test_connected_follows_link() {
        let link = LinkStatus::new(false);
        let transport =
            HttpTransport::new(HttpTransportConfig::default(), link.clone()).unwrap();

        assert!(!transport.is_connected());
        link.set_up(true);
        assert!(transport.is_connected());
        assert!(transport.link().is_up());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_failure() {
        // Port 1 on loopback is not listening
        let config = HttpTransportConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(500),
        };
        let transport = HttpTransport::new(config, LinkStatus::default()).unwrap();

        let result = transport.get("/hw_status").await;
        assert!(matches!(
            result,
            Err(ExchangeError::RequestFailed { status: None, .. })
        ));
    }
}

//! Request/response capability used by the exchange clients.
//!
//! The authorization client and the alarm poller never talk to an HTTP
//! library directly. They receive a [`Transport`], which lets the same
//! pipeline logic run over the real HTTP stack, a scripted mock, or any
//! other request/response carrier.

#![allow(async_fn_in_trait)]

use crate::error::ExchangeResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// HTTP status the decision service uses for a successful exchange.
pub const STATUS_OK: u16 = 200;

/// Raw reply from the decision service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,

    /// Response body, undecoded.
    pub body: String,
}

impl HttpReply {
    /// Create a reply.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for status 200.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Request/response transport to the decision service.
///
/// Paths are relative to the service base (e.g. `/tap`). Implementations
/// perform exactly one request per call and never retry.
pub trait Transport: Send + Sync {
    /// Whether the network link is associated.
    ///
    /// Callers check this before each exchange and skip the request when it
    /// returns `false`.
    fn is_connected(&self) -> bool;

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::RequestFailed` when no response was received.
    async fn get(&self, path: &str) -> ExchangeResult<HttpReply>;

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::RequestFailed` when no response was received.
    async fn post_json(&self, path: &str, body: String) -> ExchangeResult<HttpReply>;
}

/// Shared network link flag.
///
/// Stands in for the station's association state. Clones share the flag, so
/// the component managing the link and every transport see the same value.
#[derive(Debug, Clone)]
pub struct LinkStatus(Arc<AtomicBool>);

impl LinkStatus {
    /// Create a link flag with the given initial state.
    pub fn new(up: bool) -> Self {
        Self(Arc::new(AtomicBool::new(up)))
    }

    /// Returns `true` while the link is up.
    pub fn is_up(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the link state, logging transitions.
    pub fn set_up(&self, up: bool) {
        let previous = self.0.swap(up, Ordering::AcqRel);
        if previous != up {
            info!(up, "network link changed");
        }
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_ok() {
        assert!(HttpReply::new(200, "{}").is_ok());
        assert!(!HttpReply::new(204, "").is_ok());
        assert!(!HttpReply::new(500, "boom").is_ok());
    }

    #[test]
    fn test_link_status_shared() {
        let link = LinkStatus::new(false);
        let clone = link.clone();

        assert!(!clone.is_up());
        link.set_up(true);
        assert!(clone.is_up());
        clone.set_up(false);
        assert!(!link.is_up());
    }

    #[test]
    fn test_link_status_default_up() {
        assert!(LinkStatus::default().is_up());
    }
}

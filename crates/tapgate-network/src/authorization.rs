//! Tap authorization against the decision service.
//!
//! The client sends one POST `/tap` per tap event and turns the reply into
//! an [`AuthorizationResult`]. The policy is fail-closed: a missing link,
//! a transport failure, a non-200 status or an unexpected body all end in
//! denial. There is no retry; the cardholder presents the tag again.

use crate::error::{ExchangeError, ExchangeResult};
use crate::transport::Transport;
use crate::wire;
use tapgate_core::constants::TAP_PATH;
use tapgate_core::{AuthorizationResult, TapEvent};
use tracing::{debug, info, warn};

/// Authorization client
///
/// # Example
///
/// ```no_run
/// use tapgate_network::{AuthorizationClient, HttpTransport, HttpTransportConfig, LinkStatus};
/// use tapgate_core::{ReaderId, TagUid, TapEvent};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(HttpTransportConfig::default(), LinkStatus::new(true))?;
/// let client = AuthorizationClient::new(transport);
///
/// let event = TapEvent::new(ReaderId::ENTRY, TagUid::new(vec![0x04, 0xA1, 0xB2, 0xC3])?);
/// let result = client.submit_tap(&event).await;
/// println!("access {}", result);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationClient<T> {
    transport: T,
}

impl<T: Transport> AuthorizationClient<T> {
    /// Create a client over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform the exchange and return the tagged outcome.
    ///
    /// Nothing is sent when the transport is disconnected.
    ///
    /// # Errors
    ///
    /// - `TransportUnavailable` if the link is down
    /// - `RequestFailed` for transport failures and non-200 replies
    /// - `MalformedResponse` if the reply body does not decode
    pub async fn exchange(&self, event: &TapEvent) -> ExchangeResult<AuthorizationResult> {
        if !self.transport.is_connected() {
            return Err(ExchangeError::TransportUnavailable);
        }

        let body = wire::encode_tap(event)?;
        debug!(uid = %event.uid, direction = %event.direction, "Submitting tap");

        let reply = self.transport.post_json(TAP_PATH, body).await?;
        wire::decode_tap_reply(&reply)
    }

    /// Submit a tap and return the decision, denying on any failure.
    pub async fn submit_tap(&self, event: &TapEvent) -> AuthorizationResult {
        match self.exchange(event).await {
            Ok(result) => {
                info!(
                    uid = %event.uid,
                    direction = %event.direction,
                    reader = %event.reader,
                    result = %result,
                    "tap_decided"
                );
                result
            }
            Err(e) => {
                warn!(
                    uid = %event.uid,
                    direction = %event.direction,
                    reader = %event.reader,
                    error = %e,
                    "tap_exchange_failed"
                );
                AuthorizationResult::denied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Method, MockTransport};
    use tapgate_core::{ReaderId, TagUid};

    fn entry_tap() -> TapEvent {
        TapEvent::new(
            ReaderId::ENTRY,
            TagUid::new(vec![0x04, 0xA1, 0xB2, 0xC3]).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_allowed_reply_grants() {
        let transport = MockTransport::new();
        transport.reply("/tap", 200, r#"{"status":"allowed"}"#).await;
        let client = AuthorizationClient::new(transport.clone());

        assert!(client.submit_tap(&entry_tap()).await.is_allowed());

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"uid":"04A1B2C3","type":"entry"}"#)
        );
    }

    #[tokio::test]
    async fn test_exit_tap_carries_exit_type() {
        let transport = MockTransport::new();
        transport.reply("/tap", 200, r#"{"status":"denied"}"#).await;
        let client = AuthorizationClient::new(transport.clone());

        let event = TapEvent::new(ReaderId::EXIT, TagUid::new(vec![0x0A, 0xFF]).unwrap());
        assert!(!client.submit_tap(&event).await.is_allowed());

        let requests = transport.requests().await;
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"uid":"0AFF","type":"exit"}"#)
        );
    }

    #[tokio::test]
    async fn test_disconnected_denies_without_request() {
        let transport = MockTransport::disconnected();
        let client = AuthorizationClient::new(transport.clone());

        assert_eq!(
            client.exchange(&entry_tap()).await,
            Err(ExchangeError::TransportUnavailable)
        );
        assert!(!client.submit_tap(&entry_tap()).await.is_allowed());
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_denies() {
        let transport = MockTransport::new();
        transport.reply("/tap", 500, r#"{"status":"allowed"}"#).await;
        let client = AuthorizationClient::new(transport);

        assert!(!client.submit_tap(&entry_tap()).await.is_allowed());
    }

    #[tokio::test]
    async fn test_unreachable_server_denies() {
        let transport = MockTransport::new();
        transport
            .fail("/tap", ExchangeError::connection("timed out"))
            .await;
        let client = AuthorizationClient::new(transport);

        assert!(!client.submit_tap(&entry_tap()).await.is_allowed());
    }

    #[tokio::test]
    async fn test_malformed_body_denies() {
        let transport = MockTransport::new();
        transport.reply("/tap", 200, "allowed").await;
        let client = AuthorizationClient::new(transport);

        assert!(matches!(
            client.exchange(&entry_tap()).await,
            Err(ExchangeError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_one_request_per_tap() {
        let transport = MockTransport::new();
        transport.always_reply("/tap", 200, r#"{"status":"allowed"}"#).await;
        let client = AuthorizationClient::new(transport.clone());

        client.submit_tap(&entry_tap()).await;
        client.submit_tap(&entry_tap()).await;

        assert_eq!(transport.request_count("/tap").await, 2);
    }
}

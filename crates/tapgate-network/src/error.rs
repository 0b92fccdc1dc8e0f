use thiserror::Error;

/// Errors that can occur while exchanging with the decision service.
///
/// None of these reach the cardholder directly. The authorization client
/// turns every variant into a denial and the alarm poller keeps its previous
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Network link is down; nothing was sent.
    #[error("Transport unavailable: network link is down")]
    TransportUnavailable,

    /// The request did not complete with status 200.
    ///
    /// `status` is `None` when no HTTP response was received at all
    /// (connection refused, timeout, reset).
    #[error("Request failed: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// The response body does not match the expected schema.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl ExchangeError {
    /// Create an error for a response with a status other than 200.
    pub fn status(status: u16) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: format!("HTTP {status}"),
        }
    }

    /// Create an error for a request that never produced a response.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

/// Specialized result type for exchanges
pub type ExchangeResult<T> = Result<T, ExchangeError>;

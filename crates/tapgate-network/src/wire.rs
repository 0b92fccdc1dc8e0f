//! JSON schema of the decision service exchanges.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | GET `/hw_status` | none | `{"evac": bool, "over_cap": bool}` |
//! | POST `/tap` | `{"uid": string, "type": "entry" \| "exit"}` | `{"status": "allowed" \| other}` |
//!
//! Decoding is typed: every function returns `Ok` only for a status-200
//! reply whose body matches the schema, and a tagged [`ExchangeError`]
//! otherwise. Unknown fields are ignored.

use crate::error::{ExchangeError, ExchangeResult};
use crate::transport::HttpReply;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tapgate_core::constants::STATUS_ALLOWED;
use tapgate_core::{AuthorizationResult, Direction, TapEvent};

/// Body of a tap submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapRequest {
    /// Canonical hex UID.
    pub uid: String,

    /// Reader direction.
    #[serde(rename = "type")]
    pub direction: Direction,
}

impl From<&TapEvent> for TapRequest {
    fn from(event: &TapEvent) -> Self {
        Self {
            uid: event.uid.to_hex(),
            direction: event.direction,
        }
    }
}

/// Body of a tap decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TapReply {
    #[serde(default)]
    pub status: Option<String>,
}

impl TapReply {
    /// Only the exact `"allowed"` status grants access.
    pub fn verdict(&self) -> AuthorizationResult {
        match self.status.as_deref() {
            Some(STATUS_ALLOWED) => AuthorizationResult::granted(),
            _ => AuthorizationResult::denied(),
        }
    }
}

/// Body of the hazard status poll. Both flags are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HwStatusReply {
    pub evac: bool,
    pub over_cap: bool,
}

/// Serialize a tap event for POST `/tap`.
///
/// # Errors
///
/// Returns `ExchangeError::Encode` if serialization fails.
pub fn encode_tap(event: &TapEvent) -> ExchangeResult<String> {
    serde_json::to_string(&TapRequest::from(event)).map_err(|e| ExchangeError::Encode(e.to_string()))
}

/// Decode a tap decision.
///
/// # Errors
///
/// - `RequestFailed` for any status other than 200
/// - `MalformedResponse` if the body is not a JSON object of the expected shape
pub fn decode_tap_reply(reply: &HttpReply) -> ExchangeResult<AuthorizationResult> {
    let parsed: TapReply = decode_body(reply)?;
    Ok(parsed.verdict())
}

/// Decode a hazard status poll.
///
/// # Errors
///
/// - `RequestFailed` for any status other than 200
/// - `MalformedResponse` if either flag is missing or not a boolean
pub fn decode_hw_status(reply: &HttpReply) -> ExchangeResult<HwStatusReply> {
    decode_body(reply)
}

fn decode_body<T: DeserializeOwned>(reply: &HttpReply) -> ExchangeResult<T> {
    if !reply.is_ok() {
        return Err(ExchangeError::status(reply.status));
    }
    serde_json::from_str(&reply.body).map_err(|e| ExchangeError::malformed(e.to_string()))
}

//! Decision service exchanges for the tap endpoint.
//!
//! Two clients share one request/response [`Transport`]:
//!
//! - [`AuthorizationClient`] submits each tap and turns the reply into an
//!   allow/deny decision, denying on every failure.
//! - [`AlarmStatePoller`] refreshes the facility hazard flags at most once
//!   per poll interval and keeps the last known flags when a poll fails.
//!
//! [`HttpTransport`] is the production transport; [`MockTransport`] serves
//! scripted replies for tests and the host emulator.

pub mod alarm;
pub mod authorization;
pub mod error;
pub mod http;
pub mod mock;
pub mod transport;
pub mod wire;

pub use alarm::{AlarmPollerConfig, AlarmStatePoller, HazardState};
pub use authorization::AuthorizationClient;
pub use error::{ExchangeError, ExchangeResult};
pub use http::{HttpTransport, HttpTransportConfig};
pub use mock::MockTransport;
pub use transport::{HttpReply, LinkStatus, Transport};

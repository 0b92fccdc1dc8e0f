use crate::feedback::FeedbackState;
use tapgate_hardware::HardwareError;
use thiserror::Error;

/// Errors raised by the endpoint control logic.
///
/// None of these stop the main loop. They are logged where they occur and
/// surfaced to callers that want to react, such as the boot sequence.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// An output line could not be driven during a feedback sequence.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The feedback controller was asked for a transition it does not allow.
    #[error("Invalid feedback transition from {from} to {to}")]
    InvalidTransition {
        from: FeedbackState,
        to: FeedbackState,
    },
}

/// Result type alias for endpoint operations
pub type Result<T> = std::result::Result<T, EndpointError>;

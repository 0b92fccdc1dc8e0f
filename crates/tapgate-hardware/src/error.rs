//! Error types for hardware operations.
//!
//! This module defines error types specific to the endpoint's devices:
//! the two tag sensors and the output lines (buzzer and indicators).

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Tag reading error.
    #[error("Tag read error: {message}")]
    TagReadError { message: String },

    /// An output line could not be driven.
    #[error("Output error on {line}: {message}")]
    OutputError { line: String, message: String },
}

impl HardwareError {
    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new tag read error.
    pub fn tag_read(message: impl Into<String>) -> Self {
        Self::TagReadError {
            message: message.into(),
        }
    }

    /// Create a new output error for the given line.
    pub fn output(line: impl ToString, message: impl Into<String>) -> Self {
        Self::OutputError {
            line: line.to_string(),
            message: message.into(),
        }
    }
}

impl From<tapgate_core::Error> for HardwareError {
    fn from(error: tapgate_core::Error) -> Self {
        Self::invalid_data(error.to_string())
    }
}

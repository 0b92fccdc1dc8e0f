//! Common types shared across hardware device implementations.
//!
//! This module defines the set of output lines the endpoint drives for
//! audio/visual feedback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output lines wired to the endpoint.
///
/// The system indicator pair reports endpoint health (link, evacuation);
/// the access indicator pair reports tap decisions and over-capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLine {
    /// Piezo buzzer.
    Buzzer,

    /// Green system indicator.
    SystemGreen,

    /// Red system indicator.
    SystemRed,

    /// Green access indicator.
    AccessGreen,

    /// Red access indicator.
    AccessRed,
}

impl OutputLine {
    /// Every output line, in wiring order.
    pub const ALL: [OutputLine; 5] = [
        OutputLine::Buzzer,
        OutputLine::SystemGreen,
        OutputLine::SystemRed,
        OutputLine::AccessGreen,
        OutputLine::AccessRed,
    ];

    /// Returns `true` for the indicator LEDs.
    pub fn is_indicator(&self) -> bool {
        !matches!(self, Self::Buzzer)
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buzzer => write!(f, "buzzer"),
            Self::SystemGreen => write!(f, "system-green"),
            Self::SystemRed => write!(f, "system-red"),
            Self::AccessGreen => write!(f, "access-green"),
            Self::AccessRed => write!(f, "access-red"),
        }
    }
}

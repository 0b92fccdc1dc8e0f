//! Core constants for the tap endpoint.
//!
//! This module centralizes the fixed values shared by the endpoint crates:
//! tag UID bounds, reader numbering, decision service paths, and the timing
//! of the alarm poll and feedback sequences.
//!
//! # Usage
//!
//! ```
//! use tapgate_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(TAP_PATH, "/tap");
//! let interval = Duration::from_millis(HAZARD_POLL_INTERVAL_MS);
//! assert_eq!(interval.as_secs(), 2);
//! ```
//!
//! # Compatibility
//!
//! Paths and status strings match the decision service deployed alongside
//! the endpoints. Changing them breaks the exchange with that service.

// ============================================================================
// Tag UIDs
// ============================================================================

/// Minimum number of UID bytes accepted from a sensor.
pub const MIN_UID_LENGTH: usize = 1;

/// Maximum number of UID bytes accepted from a sensor.
///
/// ISO 14443 triple-size UIDs are 10 bytes long.
pub const MAX_UID_LENGTH: usize = 10;

// ============================================================================
// Readers
// ============================================================================

/// Reader number of the entry sensor.
pub const ENTRY_READER: u8 = 1;

/// Reader number of the exit sensor.
pub const EXIT_READER: u8 = 2;

// ============================================================================
// Decision Service
// ============================================================================

/// Base URL used when no configuration overrides it.
pub const DEFAULT_BASE_URL: &str = "http://192.168.137.1:5000/api";

/// Path polled for the hazard flags.
pub const HW_STATUS_PATH: &str = "/hw_status";

/// Path receiving tap submissions.
pub const TAP_PATH: &str = "/tap";

/// Status string the decision service uses to grant access.
///
/// Any other value, including a missing one, is a denial.
pub const STATUS_ALLOWED: &str = "allowed";

/// Default transport timeout in milliseconds.
///
/// This is enforced by the HTTP transport only; the endpoint itself never
/// cancels an exchange.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Alarm Polling
// ============================================================================

/// Minimum spacing between two hazard polls, in milliseconds.
///
/// Bounds the request rate against the decision service. Configured
/// intervals below this value are rejected.
pub const HAZARD_POLL_INTERVAL_MS: u64 = 2000;

// ============================================================================
// Feedback Timing (milliseconds)
// ============================================================================

/// Length of one short buzzer pulse.
pub const BEEP_MS: u64 = 100;

/// Silence between consecutive pulses of a multi-beep signal.
pub const BEEP_GAP_MS: u64 = 50;

/// How long the access indicator stays lit after a decision.
pub const DECISION_HOLD_MS: u64 = 1000;

/// Half period of the evacuation alarm.
pub const EVACUATION_HALF_PERIOD_MS: u64 = 200;

/// Length of the over-capacity pulse.
pub const OVER_CAPACITY_PULSE_MS: u64 = 100;

/// Pause following the over-capacity pulse.
pub const OVER_CAPACITY_PAUSE_MS: u64 = 1000;

/// Half period of the system indicator blink while waiting for the link.
pub const LINK_WAIT_HALF_PERIOD_MS: u64 = 500;

/// Default sleep between scheduler iterations on hosted targets.
pub const DEFAULT_IDLE_TICK_MS: u64 = 20;

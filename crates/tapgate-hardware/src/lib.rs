//! Hardware device abstraction layer for the tap endpoint.
//!
//! This crate provides trait-based abstractions for the peripherals of a
//! dual-reader access point: two RFID tag sensors (entry and exit) and a bank
//! of output lines (buzzer plus system and access indicators). The traits let
//! the endpoint core run unchanged against mock devices during development
//! and against real drivers on the target.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Capability-shaped**: A sensor only answers "is there a new tag?" and
//!   "halt it"; the transceiver protocol stays inside the driver.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Tag Sensors
//!
//! ```no_run
//! use tapgate_hardware::traits::TagSensor;
//! use tapgate_hardware::error::Result;
//!
//! async fn read_once<S: TagSensor>(sensor: &mut S) -> Result<()> {
//!     if let Some(uid) = sensor.poll_new_tag().await? {
//!         println!("tag {uid}");
//!         sensor.halt().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Output Lines
//!
//! ```no_run
//! use tapgate_hardware::traits::SignalOutputs;
//! use tapgate_hardware::types::OutputLine;
//! use tapgate_hardware::error::Result;
//!
//! async fn system_online<O: SignalOutputs>(outputs: &mut O) -> Result<()> {
//!     outputs.drive(OutputLine::SystemRed, false).await?;
//!     outputs.drive(OutputLine::SystemGreen, true).await
//! }
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides [`MockTagSensor`](mock::MockTagSensor) and
//! [`MockSignalOutputs`](mock::MockSignalOutputs), each paired with a handle
//! for driving or inspecting the device from tests or an emulator front end.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{SignalOutputs, TagSensor};
pub use types::OutputLine;

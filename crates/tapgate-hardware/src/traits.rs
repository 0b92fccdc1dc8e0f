//! Hardware device trait definitions.
//!
//! This module defines the contract between the endpoint core and its
//! peripherals: the tag sensors at the entry and exit points, and the output
//! lines used for feedback. Real drivers and the mocks in [`crate::mock`]
//! implement the same traits.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::OutputLine;
use tapgate_core::TagUid;

/// Tag sensor abstraction.
///
/// Represents one RFID transceiver. The anticollision and serial-read
/// protocol stay inside the implementation; the endpoint only sees
/// "the UID of a newly presented tag, if there is one".
///
/// # Presence Semantics
///
/// `poll_new_tag` reports a tag that is in the field and has not been
/// halted. After the endpoint has processed a tag it calls `halt`, which
/// silences that tag until it leaves the field. Presenting it again makes it
/// reportable again. The endpoint does no debouncing of its own.
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use tapgate_hardware::traits::TagSensor;
/// use tapgate_hardware::error::Result;
///
/// async fn next_uid<S: TagSensor>(sensor: &mut S) -> Result<Option<String>> {
///     let uid = sensor.poll_new_tag().await?;
///     Ok(uid.map(|uid| uid.to_hex()))
/// }
/// ```
pub trait TagSensor: Send + Sync {
    /// Poll once for a newly presented tag.
    ///
    /// Returns immediately with `None` when no reportable tag is in the field.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tag could not be read (collision, CRC failure)
    /// - The UID reported by the transceiver is not a valid tag UID
    async fn poll_new_tag(&mut self) -> Result<Option<TagUid>>;

    /// Halt the most recently reported tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the halt command could not be sent.
    async fn halt(&mut self) -> Result<()>;
}

/// Feedback output abstraction.
///
/// Drives the buzzer and indicator lines. Each call switches one line and
/// returns immediately; timing is owned by the caller.
///
/// # Examples
///
/// ```no_run
/// use tapgate_hardware::traits::SignalOutputs;
/// use tapgate_hardware::types::OutputLine;
/// use tapgate_hardware::error::Result;
///
/// async fn light_green<O: SignalOutputs>(outputs: &mut O) -> Result<()> {
///     outputs.drive(OutputLine::AccessGreen, true).await
/// }
/// ```
pub trait SignalOutputs: Send + Sync {
    /// Switch a single output line on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    async fn drive(&mut self, line: OutputLine, active: bool) -> Result<()>;

    /// Switch every output line off.
    ///
    /// All lines are attempted; the first error is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`drive`](Self::drive).
    async fn all_off(&mut self) -> Result<()> {
        let mut first_error = None;
        for line in OutputLine::ALL {
            if let Err(e) = self.drive(line, false).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

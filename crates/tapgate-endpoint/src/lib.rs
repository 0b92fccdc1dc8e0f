//! Control logic of the dual-reader tap endpoint.
//!
//! This crate wires the device traits from `tapgate-hardware` and the
//! exchange clients from `tapgate-network` into the running endpoint:
//!
//! - [`feedback`]: fixed buzzer/indicator sequences and the controller
//!   that plays them one at a time
//! - [`pipeline`]: tag detection, authorization, feedback and halt for one
//!   reader
//! - [`scheduler`]: the main loop giving evacuation priority over everything
//!   and servicing the entry reader before the exit reader
//! - [`boot`]: link wait and ready indication at power-on
//!
//! Everything runs as one task on a current-thread runtime. Each step is
//! awaited to completion before the next starts.

pub mod boot;
pub mod error;
pub mod feedback;
pub mod pipeline;
pub mod scheduler;

pub use error::{EndpointError, Result};
pub use feedback::{FeedbackController, FeedbackKind, FeedbackState, SignalPattern, SignalStep};
pub use pipeline::{TagReader, TapOutcome, TapPipeline};
pub use scheduler::{IterationOutcome, MainLoop, SchedulerConfig};

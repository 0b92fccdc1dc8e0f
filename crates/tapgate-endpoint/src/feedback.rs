//! Buzzer and indicator feedback.
//!
//! Every sequence the endpoint can show is a fixed [`SignalPattern`]: an
//! ordered list of line switches and holds. The [`FeedbackController`] plays
//! one pattern at a time from start to finish and cannot be interrupted,
//! which matches how a cardholder perceives the gate: the beep and the light
//! always complete before the next tag is read.
//!
//! # Sequences
//!
//! | Kind | Steps | Duration |
//! |------|-------|----------|
//! | `Success` | access-green on, buzzer 100 ms, hold 1000 ms, access-green off | 1100 ms |
//! | `Deny` | access-red on, 2 x (buzzer 100 ms, gap 50 ms), hold 1000 ms, access-red off | 1300 ms |
//! | `Evacuation` | buzzer + system-red on 200 ms, both off 200 ms | 400 ms |
//! | `OverCapacity` | buzzer + access-red on 100 ms, both off, pause 1000 ms | 1100 ms |
//! | `LinkWait` | system-red on 500 ms, off 500 ms | 1000 ms |
//! | `Ready` | system-red off, system-green on, 2 x (buzzer 100 ms, gap 50 ms) | 300 ms |
//!
//! # State Machine
//!
//! ```text
//! Idle ──render(kind)──> Rendering(kind) ──pattern done──> Idle
//! ```
//!
//! # Examples
//!
//! ```
//! use tapgate_endpoint::{FeedbackController, FeedbackKind, FeedbackState};
//! use tapgate_hardware::mock::MockSignalOutputs;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> tapgate_endpoint::Result<()> {
//! let (outputs, _handle) = MockSignalOutputs::new();
//! let mut controller = FeedbackController::new(outputs);
//!
//! controller.render(FeedbackKind::Success).await?;
//! assert_eq!(controller.state(), FeedbackState::Idle);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use tapgate_core::constants::{
    BEEP_GAP_MS, BEEP_MS, DECISION_HOLD_MS, EVACUATION_HALF_PERIOD_MS, LINK_WAIT_HALF_PERIOD_MS,
    OVER_CAPACITY_PAUSE_MS, OVER_CAPACITY_PULSE_MS,
};
use tapgate_hardware::{OutputLine, SignalOutputs};
use tracing::{debug, warn};

use crate::error::{EndpointError, Result};

/// Feedback sequences the endpoint can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// Tap authorized.
    Success,

    /// Tap refused, including every exchange failure.
    Deny,

    /// One cycle of the evacuation alarm.
    Evacuation,

    /// One over-capacity warning pulse.
    OverCapacity,

    /// One blink while waiting for the network link at boot.
    LinkWait,

    /// Online indication once the link is up.
    Ready,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FeedbackKind::Success => "Success",
            FeedbackKind::Deny => "Deny",
            FeedbackKind::Evacuation => "Evacuation",
            FeedbackKind::OverCapacity => "OverCapacity",
            FeedbackKind::LinkWait => "LinkWait",
            FeedbackKind::Ready => "Ready",
        };
        write!(f, "{}", kind)
    }
}

/// State of the feedback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackState {
    /// No sequence running.
    Idle,

    /// A sequence is being played.
    Rendering(FeedbackKind),
}

impl fmt::Display for FeedbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackState::Idle => write!(f, "Idle"),
            FeedbackState::Rendering(kind) => write!(f, "Rendering{}", kind),
        }
    }
}

impl FeedbackState {
    /// Check if transition to target state is valid from this state.
    ///
    /// Only one sequence renders at a time, so a new rendering can only
    /// start from `Idle` and a rendering can only end in `Idle`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapgate_endpoint::{FeedbackKind, FeedbackState};
    ///
    /// let deny = FeedbackState::Rendering(FeedbackKind::Deny);
    /// assert!(FeedbackState::Idle.can_transition_to(&deny));
    /// assert!(deny.can_transition_to(&FeedbackState::Idle));
    /// assert!(!deny.can_transition_to(&FeedbackState::Rendering(FeedbackKind::Success)));
    /// ```
    pub fn can_transition_to(&self, target: &FeedbackState) -> bool {
        matches!(
            (self, target),
            (FeedbackState::Idle, FeedbackState::Rendering(_))
                | (FeedbackState::Rendering(_), FeedbackState::Idle)
        )
    }

    /// Returns `true` while a sequence is running.
    pub fn is_rendering(&self) -> bool {
        matches!(self, FeedbackState::Rendering(_))
    }
}

/// One step of a signal pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStep {
    /// Switch a line on (`true`) or off (`false`).
    Set(OutputLine, bool),

    /// Keep the current line levels for a while.
    Hold(Duration),
}

/// Fixed sequence of line switches and holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPattern {
    kind: FeedbackKind,
    steps: Vec<SignalStep>,
}

impl SignalPattern {
    /// Build the pattern for a feedback kind.
    pub fn for_kind(kind: FeedbackKind) -> Self {
        use OutputLine::*;
        use SignalStep::{Hold, Set};

        let mut steps = Vec::new();
        match kind {
            FeedbackKind::Success => {
                steps.push(Set(AccessGreen, true));
                steps.extend(beep());
                steps.push(Hold(ms(DECISION_HOLD_MS)));
                steps.push(Set(AccessGreen, false));
            }
            FeedbackKind::Deny => {
                steps.push(Set(AccessRed, true));
                for _ in 0..2 {
                    steps.extend(beep());
                    steps.push(Hold(ms(BEEP_GAP_MS)));
                }
                steps.push(Hold(ms(DECISION_HOLD_MS)));
                steps.push(Set(AccessRed, false));
            }
            FeedbackKind::Evacuation => {
                steps.extend([
                    Set(Buzzer, true),
                    Set(SystemRed, true),
                    Hold(ms(EVACUATION_HALF_PERIOD_MS)),
                    Set(Buzzer, false),
                    Set(SystemRed, false),
                    Hold(ms(EVACUATION_HALF_PERIOD_MS)),
                ]);
            }
            FeedbackKind::OverCapacity => {
                steps.extend([
                    Set(Buzzer, true),
                    Set(AccessRed, true),
                    Hold(ms(OVER_CAPACITY_PULSE_MS)),
                    Set(Buzzer, false),
                    Set(AccessRed, false),
                    Hold(ms(OVER_CAPACITY_PAUSE_MS)),
                ]);
            }
            FeedbackKind::LinkWait => {
                steps.extend([
                    Set(SystemRed, true),
                    Hold(ms(LINK_WAIT_HALF_PERIOD_MS)),
                    Set(SystemRed, false),
                    Hold(ms(LINK_WAIT_HALF_PERIOD_MS)),
                ]);
            }
            FeedbackKind::Ready => {
                steps.push(Set(SystemRed, false));
                steps.push(Set(SystemGreen, true));
                for _ in 0..2 {
                    steps.extend(beep());
                    steps.push(Hold(ms(BEEP_GAP_MS)));
                }
            }
        }

        Self { kind, steps }
    }

    /// Feedback kind this pattern renders.
    pub fn kind(&self) -> FeedbackKind {
        self.kind
    }

    /// Steps in playback order.
    pub fn steps(&self) -> &[SignalStep] {
        &self.steps
    }

    /// Sum of all holds.
    pub fn duration(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                SignalStep::Hold(d) => *d,
                SignalStep::Set(..) => Duration::ZERO,
            })
            .sum()
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn beep() -> [SignalStep; 3] {
    [
        SignalStep::Set(OutputLine::Buzzer, true),
        SignalStep::Hold(ms(BEEP_MS)),
        SignalStep::Set(OutputLine::Buzzer, false),
    ]
}

/// Feedback controller
///
/// Owns the output lines and plays [`SignalPattern`]s on them.
#[derive(Debug)]
pub struct FeedbackController<O> {
    outputs: O,
    state: FeedbackState,
    rendered: u64,
}

impl<O: SignalOutputs> FeedbackController<O> {
    /// Create a controller in the `Idle` state.
    pub fn new(outputs: O) -> Self {
        Self {
            outputs,
            state: FeedbackState::Idle,
            rendered: 0,
        }
    }

    /// Current controller state.
    pub fn state(&self) -> FeedbackState {
        self.state
    }

    /// Number of sequences rendered since creation.
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Get a reference to the output lines.
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Play one sequence to completion.
    ///
    /// A line that fails to switch is logged and the remaining steps still
    /// run, so nothing stays energized because of an earlier failure.
    ///
    /// # Errors
    ///
    /// Returns the first `EndpointError::Hardware` raised during the
    /// sequence, after the sequence has finished.
    pub async fn render(&mut self, kind: FeedbackKind) -> Result<()> {
        self.transition_to(FeedbackState::Rendering(kind))?;

        let pattern = SignalPattern::for_kind(kind);
        debug!(%kind, duration_ms = pattern.duration().as_millis() as u64, "Rendering feedback");

        let mut first_error = None;
        for step in pattern.steps() {
            match *step {
                SignalStep::Set(line, active) => {
                    if let Err(e) = self.outputs.drive(line, active).await {
                        warn!(%kind, %line, active, error = %e, "Failed to drive output line");
                        first_error.get_or_insert(e);
                    }
                }
                SignalStep::Hold(duration) => tokio::time::sleep(duration).await,
            }
        }

        self.rendered += 1;
        self.transition_to(FeedbackState::Idle)?;

        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Switch every line off.
    ///
    /// # Errors
    ///
    /// Returns the first line failure.
    pub async fn reset(&mut self) -> Result<()> {
        self.outputs.all_off().await?;
        Ok(())
    }

    fn transition_to(&mut self, target: FeedbackState) -> Result<()> {
        if !self.state.can_transition_to(&target) {
            return Err(EndpointError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}

//! Main control loop.
//!
//! One iteration does the following, strictly in order and without overlap:
//!
//! 1. Refresh the hazard flags if the poll interval has elapsed.
//! 2. Evacuation active: render one evacuation cycle and end the iteration
//!    without touching either reader.
//! 3. Over-capacity active: render one warning pulse, then carry on.
//! 4. Service the entry reader, then the exit reader.
//!
//! Every await inside an iteration finishes before the next step starts, so
//! a tag presented while feedback is playing is only seen afterwards.

use std::time::Duration;

use tapgate_core::ReaderId;
use tapgate_core::constants::DEFAULT_IDLE_TICK_MS;
use tapgate_hardware::{SignalOutputs, TagSensor};
use tapgate_network::{AlarmStatePoller, AuthorizationClient, HazardState, Transport};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::feedback::{FeedbackController, FeedbackKind};
use crate::pipeline::{TagReader, TapOutcome, TapPipeline};

/// Configuration for [`MainLoop::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Pause between iterations.
    pub idle_tick: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_tick: Duration::from_millis(DEFAULT_IDLE_TICK_MS),
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Evacuation cycle rendered; readers were not sampled.
    Evacuation,

    /// Readers sampled; contains the taps processed, entry first.
    Completed { taps: Vec<TapOutcome> },
}

impl IterationOutcome {
    /// Taps processed in this iteration.
    pub fn taps(&self) -> &[TapOutcome] {
        match self {
            IterationOutcome::Evacuation => &[],
            IterationOutcome::Completed { taps } => taps,
        }
    }
}

/// Endpoint scheduler
///
/// Owns every component of the endpoint. `T` is the transport shared by the
/// authorization client and the alarm poller, `S` the tag sensor type and
/// `O` the output bank.
#[derive(Debug)]
pub struct MainLoop<T, S, O> {
    poller: AlarmStatePoller<T>,
    pipeline: TapPipeline<T, O>,
    readers: [TagReader<S>; 2],
    config: SchedulerConfig,
    iterations: u64,
}

impl<T, S, O> MainLoop<T, S, O>
where
    T: Transport,
    S: TagSensor,
    O: SignalOutputs,
{
    /// Assemble the endpoint.
    pub fn new(
        client: AuthorizationClient<T>,
        poller: AlarmStatePoller<T>,
        feedback: FeedbackController<O>,
        entry: S,
        exit: S,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            poller,
            pipeline: TapPipeline::new(client, feedback),
            readers: [
                TagReader::new(ReaderId::ENTRY, entry),
                TagReader::new(ReaderId::EXIT, exit),
            ],
            config,
            iterations: 0,
        }
    }

    /// Current hazard flags.
    pub fn hazard(&self) -> HazardState {
        self.poller.state()
    }

    /// Get a reference to the feedback controller.
    pub fn feedback(&self) -> &FeedbackController<O> {
        self.pipeline.feedback()
    }

    /// Number of iterations run so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Wait for the network link, then show the ready indication.
    ///
    /// # Errors
    ///
    /// Returns the first output failure. The link wait itself never fails.
    pub async fn boot(&mut self) -> Result<()> {
        self.pipeline.boot().await
    }

    /// Run one iteration.
    pub async fn run_once(&mut self) -> IterationOutcome {
        self.iterations += 1;
        let hazard = self.poller.refresh_if_due(Instant::now()).await;
        trace!(
            iteration = self.iterations,
            evac = hazard.evacuation_active(),
            over_cap = hazard.over_capacity_active(),
            "Iteration start"
        );

        if hazard.evacuation_active() {
            self.render(FeedbackKind::Evacuation).await;
            return IterationOutcome::Evacuation;
        }

        if hazard.over_capacity_active() {
            self.render(FeedbackKind::OverCapacity).await;
        }

        let mut taps = Vec::new();
        for reader in self.readers.iter_mut() {
            if let Some(outcome) = self.pipeline.service(reader).await {
                taps.push(outcome);
            }
        }

        IterationOutcome::Completed { taps }
    }

    /// Run iterations forever, pausing for the idle tick between them.
    pub async fn run(&mut self) {
        info!(
            idle_tick_ms = self.config.idle_tick.as_millis() as u64,
            "Main loop started"
        );
        loop {
            let outcome = self.run_once().await;
            if !outcome.taps().is_empty() {
                debug!(taps = outcome.taps().len(), "Iteration processed taps");
            }
            tokio::time::sleep(self.config.idle_tick).await;
        }
    }

    /// Switch every output off.
    ///
    /// # Errors
    ///
    /// Returns the first output failure.
    pub async fn shutdown(&mut self) -> Result<()> {
        info!(iterations = self.iterations, "Main loop stopped");
        self.pipeline.feedback_mut().reset().await
    }

    async fn render(&mut self, kind: FeedbackKind) {
        if let Err(e) = self.pipeline.feedback_mut().render(kind).await {
            warn!(%kind, error = %e, "Feedback incomplete");
        }
    }
}

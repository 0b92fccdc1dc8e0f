//! Rate-limited hazard status polling.
//!
//! The poller keeps the last known evacuation and over-capacity flags. The
//! main loop asks it to refresh once per iteration; at most one GET
//! `/hw_status` goes out per poll interval, measured from the previous
//! attempt whether or not that attempt succeeded. A failed poll keeps the
//! previous flags, so a server outage never clears an active evacuation.

use crate::error::ExchangeResult;
use crate::transport::Transport;
use crate::wire::{self, HwStatusReply};
use std::time::Duration;
use tapgate_core::constants::{HAZARD_POLL_INTERVAL_MS, HW_STATUS_PATH};
use tapgate_core::{Error, Result};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Last known facility hazard flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HazardState {
    evacuation_active: bool,
    over_capacity_active: bool,
    last_refreshed: Option<Instant>,
}

impl HazardState {
    /// Whether an evacuation is in progress.
    pub fn evacuation_active(&self) -> bool {
        self.evacuation_active
    }

    /// Whether the facility is over capacity.
    pub fn over_capacity_active(&self) -> bool {
        self.over_capacity_active
    }

    /// When the flags were last replaced by a successful poll.
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.last_refreshed
    }

    pub(crate) fn apply(&mut self, reply: HwStatusReply, at: Instant) {
        self.evacuation_active = reply.evac;
        self.over_capacity_active = reply.over_cap;
        self.last_refreshed = Some(at);
    }
}

/// Configuration for [`AlarmStatePoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmPollerConfig {
    interval: Duration,
}

impl AlarmPollerConfig {
    /// Shortest accepted poll interval.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(HAZARD_POLL_INTERVAL_MS);

    /// Create a config with a custom poll interval.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `interval` is shorter than
    /// [`Self::MIN_INTERVAL`].
    pub fn new(interval: Duration) -> Result<Self> {
        if interval < Self::MIN_INTERVAL {
            return Err(Error::Config(format!(
                "hazard poll interval {}ms is below the {}ms minimum",
                interval.as_millis(),
                HAZARD_POLL_INTERVAL_MS
            )));
        }
        Ok(Self { interval })
    }

    /// Poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for AlarmPollerConfig {
    fn default() -> Self {
        Self {
            interval: Self::MIN_INTERVAL,
        }
    }
}

/// Hazard status poller
///
/// Owns the [`HazardState`]; nothing else mutates it.
#[derive(Debug)]
pub struct AlarmStatePoller<T> {
    transport: T,
    interval: Duration,
    state: HazardState,
    last_attempt: Option<Instant>,
}

impl<T: Transport> AlarmStatePoller<T> {
    /// Create a poller with all flags clear.
    pub fn new(transport: T, config: AlarmPollerConfig) -> Self {
        Self {
            transport,
            interval: config.interval(),
            state: HazardState::default(),
            last_attempt: None,
        }
    }

    /// Current hazard flags.
    pub fn state(&self) -> HazardState {
        self.state
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a poll would be issued at `now`, link permitting.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Poll the service if the link is up and the interval has elapsed.
    ///
    /// Returns the state after the call, which is the previous state when
    /// nothing was due or the poll failed.
    pub async fn refresh_if_due(&mut self, now: Instant) -> HazardState {
        if !self.transport.is_connected() || !self.is_due(now) {
            return self.state;
        }
        self.last_attempt = Some(now);

        match self.poll().await {
            Ok(reply) => {
                let previous = self.state;
                self.state.apply(reply, now);
                log_transitions(&previous, &self.state);
                debug!(evac = reply.evac, over_cap = reply.over_cap, "hazard status refreshed");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    evac = self.state.evacuation_active,
                    over_cap = self.state.over_capacity_active,
                    "hazard poll failed, keeping last known state"
                );
            }
        }
        self.state
    }

    async fn poll(&self) -> ExchangeResult<HwStatusReply> {
        let reply = self.transport.get(HW_STATUS_PATH).await?;
        wire::decode_hw_status(&reply)
    }
}

fn log_transitions(previous: &HazardState, current: &HazardState) {
    if previous.evacuation_active != current.evacuation_active {
        if current.evacuation_active {
            warn!("evacuation started");
        } else {
            info!("evacuation cleared");
        }
    }
    if previous.over_capacity_active != current.over_capacity_active {
        if current.over_capacity_active {
            warn!("facility over capacity");
        } else {
            info!("capacity back to normal");
        }
    }
}

//! Mock output lines for testing and development.
//!
//! Records every line change with a timestamp so tests can check both the
//! order and the timing of a feedback sequence.

use crate::{HardwareError, Result, traits::SignalOutputs, types::OutputLine};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// One recorded line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChange {
    /// Line that changed.
    pub line: OutputLine,

    /// New level of the line.
    pub active: bool,

    /// When the change was driven.
    pub at: Instant,
}

/// Mock output bank.
///
/// # Examples
///
/// ```
/// use tapgate_hardware::mock::MockSignalOutputs;
/// use tapgate_hardware::traits::SignalOutputs;
/// use tapgate_hardware::types::OutputLine;
///
/// #[tokio::main]
/// async fn main() -> tapgate_hardware::Result<()> {
///     let (mut outputs, handle) = MockSignalOutputs::new();
///
///     outputs.drive(OutputLine::Buzzer, true).await?;
///     assert!(handle.is_active(OutputLine::Buzzer).await);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSignalOutputs {
    bank: Arc<Mutex<Bank>>,
}

impl MockSignalOutputs {
    /// Create a new mock output bank with every line off.
    pub fn new() -> (Self, MockSignalOutputsHandle) {
        let bank = Arc::new(Mutex::new(Bank::default()));

        let outputs = Self {
            bank: Arc::clone(&bank),
        };

        (outputs, MockSignalOutputsHandle { bank })
    }
}

impl SignalOutputs for MockSignalOutputs {
    async fn drive(&mut self, line: OutputLine, active: bool) -> Result<()> {
        let mut bank = self.bank.lock().await;

        if bank.failing.contains(&line) {
            return Err(HardwareError::output(line, "injected failure"));
        }

        bank.levels.insert(line, active);
        bank.changes.push(SignalChange {
            line,
            active,
            at: Instant::now(),
        });

        Ok(())
    }
}

#[derive(Debug, Default)]
struct Bank {
    levels: HashMap<OutputLine, bool>,
    changes: Vec<SignalChange>,
    failing: HashSet<OutputLine>,
}

/// Handle for inspecting a mock output bank.
#[derive(Debug, Clone)]
pub struct MockSignalOutputsHandle {
    bank: Arc<Mutex<Bank>>,
}

impl MockSignalOutputsHandle {
    /// Current level of a line.
    pub async fn is_active(&self, line: OutputLine) -> bool {
        self.bank
            .lock()
            .await
            .levels
            .get(&line)
            .copied()
            .unwrap_or(false)
    }

    /// Lines currently switched on.
    pub async fn active_lines(&self) -> Vec<OutputLine> {
        let bank = self.bank.lock().await;
        OutputLine::ALL
            .into_iter()
            .filter(|line| bank.levels.get(line).copied().unwrap_or(false))
            .collect()
    }

    /// All recorded changes, oldest first.
    pub async fn changes(&self) -> Vec<SignalChange> {
        self.bank.lock().await.changes.clone()
    }

    /// Number of times a line was switched on.
    pub async fn activations(&self, line: OutputLine) -> usize {
        self.bank
            .lock()
            .await
            .changes
            .iter()
            .filter(|c| c.line == line && c.active)
            .count()
    }

    /// Forget recorded changes; levels are kept.
    pub async fn clear_changes(&self) {
        self.bank.lock().await.changes.clear();
    }

    /// Make every drive of `line` fail until [`restore`](Self::restore).
    pub async fn fail_line(&self, line: OutputLine) {
        self.bank.lock().await.failing.insert(line);
    }

    /// Stop failing drives of `line`.
    pub async fn restore(&self, line: OutputLine) {
        self.bank.lock().await.failing.remove(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_drive_records_levels() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        outputs.drive(OutputLine::AccessGreen, true).await.unwrap();
        assert!(handle.is_active(OutputLine::AccessGreen).await);
        assert_eq!(handle.active_lines().await, vec![OutputLine::AccessGreen]);

        outputs.drive(OutputLine::AccessGreen, false).await.unwrap();
        assert!(!handle.is_active(OutputLine::AccessGreen).await);
        assert_eq!(handle.changes().await.len(), 2);
        assert_eq!(handle.activations(OutputLine::AccessGreen).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_are_timestamped() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        outputs.drive(OutputLine::Buzzer, true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        outputs.drive(OutputLine::Buzzer, false).await.unwrap();

        let changes = handle.changes().await;
        assert_eq!(changes[1].at - changes[0].at, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_all_off() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        outputs.drive(OutputLine::Buzzer, true).await.unwrap();
        outputs.drive(OutputLine::SystemRed, true).await.unwrap();

        outputs.all_off().await.unwrap();
        assert!(handle.active_lines().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_off_reports_failure_but_continues() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        outputs.drive(OutputLine::AccessRed, true).await.unwrap();
        handle.fail_line(OutputLine::Buzzer).await;

        let result = outputs.all_off().await;
        assert!(matches!(result, Err(HardwareError::OutputError { .. })));
        assert!(!handle.is_active(OutputLine::AccessRed).await);
    }

    #[tokio::test]
    async fn test_restore_line() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        handle.fail_line(OutputLine::Buzzer).await;
        assert!(outputs.drive(OutputLine::Buzzer, true).await.is_err());

        handle.restore(OutputLine::Buzzer).await;
        assert!(outputs.drive(OutputLine::Buzzer, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_changes_keeps_levels() {
        let (mut outputs, handle) = MockSignalOutputs::new();

        outputs.drive(OutputLine::SystemGreen, true).await.unwrap();
        handle.clear_changes().await;

        assert!(handle.changes().await.is_empty());
        assert!(handle.is_active(OutputLine::SystemGreen).await);
    }
}

//! Operator console for the host emulator.
//!
//! Stdin lines stand in for the physical world: tags placed on or taken off
//! a reader and the network link coming and going. Output lines are rendered
//! as log records.

use std::str::FromStr;

use tapgate_core::ReaderId;
use tapgate_hardware::mock::MockTagSensorHandle;
use tapgate_hardware::{OutputLine, Result as HardwareResult, SignalOutputs};
use tapgate_network::LinkStatus;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

pub const HELP: &str = "\
commands:
  tap <reader> <uid-hex>   present a tag (reader 1 = entry, 2 = exit)
  remove <reader>          take the tag off a reader
  link up|down             simulate network association
  help                     show this text";

/// Parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tap { reader: ReaderId, uid: Vec<u8> },
    Remove { reader: ReaderId },
    Link { up: bool },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("invalid reader: {0}")]
    InvalidReader(String),

    #[error("invalid UID hex: {0}")]
    InvalidUid(String),

    #[error("link state must be 'up' or 'down', got: {0}")]
    InvalidLinkState(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();

        let parsed = match command.as_str() {
            "tap" => {
                let reader = parse_reader(words.next())?;
                let hex_uid = words.next().ok_or(CommandError::MissingArgument("uid"))?;
                let uid = hex::decode(hex_uid.replace(':', ""))
                    .map_err(|_| CommandError::InvalidUid(hex_uid.to_string()))?;
                Command::Tap { reader, uid }
            }
            "remove" => Command::Remove {
                reader: parse_reader(words.next())?,
            },
            "link" => match words.next() {
                Some("up") => Command::Link { up: true },
                Some("down") => Command::Link { up: false },
                Some(other) => return Err(CommandError::InvalidLinkState(other.to_string())),
                None => return Err(CommandError::MissingArgument("up|down")),
            },
            "help" | "?" => Command::Help,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(parsed),
        }
    }
}

fn parse_reader(word: Option<&str>) -> Result<ReaderId, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("reader"))?;
    word.parse()
        .map_err(|_| CommandError::InvalidReader(word.to_string()))
}

/// Console driving the emulated sensors and link.
#[derive(Debug, Clone)]
pub struct Console {
    entry: MockTagSensorHandle,
    exit: MockTagSensorHandle,
    link: LinkStatus,
}

impl Console {
    pub fn new(entry: MockTagSensorHandle, exit: MockTagSensorHandle, link: LinkStatus) -> Self {
        Self { entry, exit, link }
    }

    fn sensor(&self, reader: ReaderId) -> &MockTagSensorHandle {
        if reader == ReaderId::ENTRY {
            &self.entry
        } else {
            &self.exit
        }
    }

    /// Apply one command and return the text to show the operator.
    pub async fn apply(&self, command: Command) -> String {
        match command {
            Command::Tap { reader, uid } => match self.sensor(reader).present_tag(uid).await {
                Ok(()) => format!("tag placed on {} reader", reader.direction()),
                Err(e) => format!("error: {e}"),
            },
            Command::Remove { reader } => {
                self.sensor(reader).remove_tag().await;
                format!("tag removed from {} reader", reader.direction())
            }
            Command::Link { up } => {
                self.link.set_up(up);
                format!("link {}", if up { "up" } else { "down" })
            }
            Command::Help => HELP.to_string(),
        }
    }

    /// Read commands from stdin until it closes.
    pub async fn run(self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{HELP}");

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => println!("{}", self.apply(command).await),
                Err(e) => println!("error: {e} (type 'help')"),
            }
        }

        debug!("Console input closed");
    }
}

/// Output bank rendered as log records.
#[derive(Debug, Default)]
pub struct ConsoleSignals {
    levels: [bool; OutputLine::ALL.len()],
}

impl ConsoleSignals {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(line: OutputLine) -> usize {
        OutputLine::ALL
            .iter()
            .position(|l| *l == line)
            .unwrap_or_default()
    }
}

impl SignalOutputs for ConsoleSignals {
    async fn drive(&mut self, line: OutputLine, active: bool) -> HardwareResult<()> {
        let level = &mut self.levels[Self::index(line)];
        if *level == active {
            return Ok(());
        }
        *level = active;

        let state = if active { "on" } else { "off" };
        if line.is_indicator() {
            info!(%line, state, "output");
        } else {
            debug!(%line, state, "output");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tapgate_hardware::mock::MockTagSensor;

    #[rstest]
    #[case("tap 1 04A1B2C3", Command::Tap { reader: ReaderId::ENTRY, uid: vec![0x04, 0xA1, 0xB2, 0xC3] })]
    #[case("tap 2 de:ad", Command::Tap { reader: ReaderId::EXIT, uid: vec![0xDE, 0xAD] })]
    #[case("  TAP 1 0a ", Command::Tap { reader: ReaderId::ENTRY, uid: vec![0x0A] })]
    #[case("remove 2", Command::Remove { reader: ReaderId::EXIT })]
    #[case("link down", Command::Link { up: false })]
    #[case("link up", Command::Link { up: true })]
    #[case("help", Command::Help)]
    fn test_parse_command(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(line.parse::<Command>().unwrap(), expected);
    }

    #[rstest]
    #[case("", CommandError::Unknown(String::new()))]
    #[case("open", CommandError::Unknown("open".to_string()))]
    #[case("tap", CommandError::MissingArgument("reader"))]
    #[case("tap 1", CommandError::MissingArgument("uid"))]
    #[case("tap 3 01", CommandError::InvalidReader("3".to_string()))]
    #[case("tap 1 0G", CommandError::InvalidUid("0G".to_string()))]
    #[case("tap 1 ABC", CommandError::InvalidUid("ABC".to_string()))]
    #[case("link sideways", CommandError::InvalidLinkState("sideways".to_string()))]
    #[case("remove 1 now", CommandError::UnexpectedArgument("now".to_string()))]
    fn test_parse_errors(#[case] line: &str, #[case] expected: CommandError) {
        assert_eq!(line.parse::<Command>().unwrap_err(), expected);
    }

    #[tokio::test]
    async fn test_apply_drives_sensors_and_link() {
        let (_entry_sensor, entry) = MockTagSensor::new();
        let (_exit_sensor, exit) = MockTagSensor::new();
        let link = LinkStatus::new(true);
        let console = Console::new(entry.clone(), exit.clone(), link.clone());

        console
            .apply("tap 2 0102".parse().unwrap())
            .await;
        assert!(exit.is_tag_in_field().await);
        assert!(!entry.is_tag_in_field().await);

        console.apply("remove 2".parse().unwrap()).await;
        assert!(!exit.is_tag_in_field().await);

        console.apply("link down".parse().unwrap()).await;
        assert!(!link.is_up());
    }

    #[tokio::test]
    async fn test_apply_reports_oversized_uid() {
        let (_entry_sensor, entry) = MockTagSensor::new();
        let (_exit_sensor, exit) = MockTagSensor::new();
        let console = Console::new(entry.clone(), exit, LinkStatus::default());

        let reply = console
            .apply("tap 1 0102030405060708090A0B".parse().unwrap())
            .await;

        assert!(reply.starts_with("error:"));
        assert!(!entry.is_tag_in_field().await);
    }

    #[tokio::test]
    async fn test_console_signals_track_levels() {
        let mut signals = ConsoleSignals::new();
        signals.drive(OutputLine::AccessGreen, true).await.unwrap();
        signals.drive(OutputLine::AccessGreen, true).await.unwrap();
        assert!(signals.levels[ConsoleSignals::index(OutputLine::AccessGreen)]);

        signals.all_off().await.unwrap();
        assert!(signals.levels.iter().all(|on| !on));
    }
}

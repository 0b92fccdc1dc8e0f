use crate::{
    Result,
    constants::{ENTRY_READER, EXIT_READER, MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag unique identifier (1-10 bytes).
///
/// The canonical text form is uppercase hexadecimal with two characters per
/// byte, which is what the decision service receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagUid(Vec<u8>);

impl TagUid {
    /// Create a tag UID with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the UID is empty or longer than
    /// `MAX_UID_LENGTH` bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidUid(format!(
                "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {len}"
            )));
        }
        Ok(TagUid(bytes))
    }

    /// Get the raw UID bytes as read from the tag.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of UID bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; construction rejects empty UIDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical uppercase, zero-padded hex form (e.g. `04A1B2C3`).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<&[u8]> for TagUid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        TagUid::new(bytes)
    }
}

/// Passage direction
///
/// Serialized as `"entry"` / `"exit"`, the values the decision service
/// expects in the `type` field of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    /// Wire representation of the direction.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Entry => "entry",
            Direction::Exit => "exit",
        }
    }

    /// Returns `true` if direction is Entry.
    #[inline]
    #[must_use]
    pub fn is_entry(self) -> bool {
        matches!(self, Direction::Entry)
    }

    /// Returns `true` if direction is Exit.
    #[inline]
    #[must_use]
    pub fn is_exit(self) -> bool {
        matches!(self, Direction::Exit)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Entry => write!(f, "Entry"),
            Direction::Exit => write!(f, "Exit"),
        }
    }
}

/// Physical reader identifier (1 = entry, 2 = exit).
///
/// The direction of a tap is a property of the reader that saw it, never of
/// the tag, so the mapping lives here and cannot be changed at runtime. Only
/// the two wired positions can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReaderId(Position);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Position {
    Entry,
    Exit,
}

impl ReaderId {
    /// The entry reader (sensor 1).
    pub const ENTRY: ReaderId = ReaderId(Position::Entry);

    /// The exit reader (sensor 2).
    pub const EXIT: ReaderId = ReaderId(Position::Exit);

    /// Create a reader ID with validation.
    ///
    /// # Errors
    /// Returns `Error::UnknownReader` for anything other than 1 or 2.
    pub fn new(number: u8) -> Result<Self> {
        match number {
            ENTRY_READER => Ok(Self::ENTRY),
            EXIT_READER => Ok(Self::EXIT),
            _ => Err(Error::UnknownReader {
                number,
                min: ENTRY_READER,
                max: EXIT_READER,
            }),
        }
    }

    /// Get the raw reader number.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        match self.0 {
            Position::Entry => ENTRY_READER,
            Position::Exit => EXIT_READER,
        }
    }

    /// Direction assigned to this reader.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self.0 {
            Position::Entry => Direction::Entry,
            Position::Exit => Direction::Exit,
        }
    }
}

impl TryFrom<u8> for ReaderId {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        ReaderId::new(number)
    }
}

impl From<ReaderId> for u8 {
    fn from(reader: ReaderId) -> u8 {
        reader.as_u8()
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl std::str::FromStr for ReaderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number: u8 = s.trim().parse().map_err(|_| Error::UnknownReader {
            number: 0,
            min: ENTRY_READER,
            max: EXIT_READER,
        })?;
        ReaderId::new(number)
    }
}

/// A single tag presentation at one reader.
///
/// Created when a sensor reports a new tag and consumed by the authorization
/// exchange in the same scheduler pass. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapEvent {
    /// UID of the presented tag.
    pub uid: TagUid,

    /// Direction implied by the reader.
    pub direction: Direction,

    /// Reader that detected the tag.
    pub reader: ReaderId,

    /// Wall-clock time of detection.
    pub detected_at: DateTime<Utc>,
}

impl TapEvent {
    /// Create a tap event detected now at the given reader.
    #[must_use]
    pub fn new(reader: ReaderId, uid: TagUid) -> Self {
        Self::at(reader, uid, Utc::now())
    }

    /// Create a tap event with an explicit detection time.
    #[must_use]
    pub fn at(reader: ReaderId, uid: TagUid, detected_at: DateTime<Utc>) -> Self {
        Self {
            uid,
            direction: reader.direction(),
            reader,
            detected_at,
        }
    }
}

/// Outcome of an authorization exchange.
///
/// Every failure path produces `denied()`; there is no undefined outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthorizationResult {
    pub allowed: bool,
}

impl AuthorizationResult {
    /// Access granted.
    #[must_use]
    pub fn granted() -> Self {
        Self { allowed: true }
    }

    /// Access denied.
    #[must_use]
    pub fn denied() -> Self {
        Self { allowed: false }
    }

    /// Returns `true` if access was granted.
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

impl fmt::Display for AuthorizationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.allowed {
            write!(f, "allowed")
        } else {
            write!(f, "denied")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0x04, 0xA1, 0xB2, 0xC3], "04A1B2C3")]
    #[case(vec![0x0A], "0A")]
    #[case(vec![0xFF], "FF")]
    #[case(vec![0x00, 0x01], "0001")]
    #[case(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22], "DEADBEEF001122")]
    fn test_uid_hex(#[case] bytes: Vec<u8>, #[case] expected: &str) {
        let uid = TagUid::new(bytes).unwrap();
        assert_eq!(uid.to_hex(), expected);
        assert_eq!(uid.to_string(), expected);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![0u8; 11])]
    fn test_uid_invalid_length(#[case] bytes: Vec<u8>) {
        let result = TagUid::new(bytes);
        assert!(matches!(result, Err(Error::InvalidUid(_))));
    }

    #[test]
    fn test_uid_from_slice() {
        let bytes: &[u8] = &[0x12, 0x34];
        let uid = TagUid::try_from(bytes).unwrap();
        assert_eq!(uid.as_bytes(), bytes);
        assert_eq!(uid.len(), 2);
        assert!(!uid.is_empty());
    }

    proptest! {
        #[test]
        fn prop_uid_hex_is_canonical(bytes in prop::collection::vec(any::<u8>(), 1..=10)) {
            let first = TagUid::new(bytes.clone()).unwrap().to_hex();
            let second = TagUid::new(bytes.clone()).unwrap().to_hex();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), bytes.len() * 2);
            prop_assert!(first.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

            for (i, byte) in bytes.iter().enumerate() {
                let pair = &first[i * 2..i * 2 + 2];
                prop_assert_eq!(u8::from_str_radix(pair, 16).unwrap(), *byte);
            }
        }
    }

    #[rstest]
    #[case(1, Direction::Entry)]
    #[case(2, Direction::Exit)]
    fn test_reader_direction(#[case] number: u8, #[case] expected: Direction) {
        let reader = ReaderId::new(number).unwrap();
        assert_eq!(reader.direction(), expected);
        assert_eq!(reader.as_u8(), number);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(255)]
    fn test_reader_unknown(#[case] number: u8) {
        assert!(matches!(
            ReaderId::new(number),
            Err(Error::UnknownReader { .. })
        ));
    }

    #[rstest]
    #[case("1", ReaderId::ENTRY)]
    #[case(" 2 ", ReaderId::EXIT)]
    fn test_reader_parse(#[case] input: &str, #[case] expected: ReaderId) {
        let reader: ReaderId = input.parse().unwrap();
        assert_eq!(reader, expected);
    }

    #[rstest]
    #[case(1, Ok(ReaderId::ENTRY))]
    #[case(2, Ok(ReaderId::EXIT))]
    #[case(0, Err(()))]
    #[case(7, Err(()))]
    fn test_reader_try_from(
        #[case] number: u8,
        #[case] expected: std::result::Result<ReaderId, ()>,
    ) {
        let reader = ReaderId::try_from(number).map_err(|_| ());
        assert_eq!(reader, expected);
        if let Ok(reader) = reader {
            assert_eq!(u8::from(reader), number);
        }
    }

    proptest! {
        #[test]
        fn prop_only_wired_readers_exist(number in any::<u8>()) {
            match ReaderId::new(number) {
                Ok(reader) => {
                    prop_assert!(number == ENTRY_READER || number == EXIT_READER);
                    prop_assert_eq!(reader.as_u8(), number);
                    prop_assert_eq!(reader.direction().is_entry(), number == ENTRY_READER);
                }
                Err(e) => {
                    prop_assert!(number != ENTRY_READER && number != EXIT_READER);
                    let is_unknown = matches!(e, Error::UnknownReader { .. });
                    prop_assert!(is_unknown);
                }
            }
        }
    }

    #[test]
    fn test_reader_parse_invalid() {
        assert!("entry".parse::<ReaderId>().is_err());
        assert!("7".parse::<ReaderId>().is_err());
    }

    proptest! {
        #[test]
        fn prop_direction_ignores_uid(bytes in prop::collection::vec(any::<u8>(), 1..=10)) {
            let uid = TagUid::new(bytes).unwrap();
            let entry = TapEvent::new(ReaderId::ENTRY, uid.clone());
            let exit = TapEvent::new(ReaderId::EXIT, uid);
            prop_assert_eq!(entry.direction, Direction::Entry);
            prop_assert_eq!(exit.direction, Direction::Exit);
        }
    }

    #[test]
    fn test_direction_wire_form() {
        assert_eq!(Direction::Entry.as_str(), "entry");
        assert_eq!(Direction::Exit.as_str(), "exit");
        assert_eq!(serde_json::to_string(&Direction::Exit).unwrap(), "\"exit\"");
        assert_eq!(
            serde_json::from_str::<Direction>("\"entry\"").unwrap(),
            Direction::Entry
        );
        assert!(Direction::Entry.is_entry());
        assert!(Direction::Exit.is_exit());
    }

    #[test]
    fn test_authorization_result() {
        assert!(AuthorizationResult::granted().is_allowed());
        assert!(!AuthorizationResult::denied().is_allowed());
        assert_eq!(AuthorizationResult::default(), AuthorizationResult::denied());
        assert_eq!(AuthorizationResult::granted().to_string(), "allowed");
        assert_eq!(AuthorizationResult::denied().to_string(), "denied");
    }
}

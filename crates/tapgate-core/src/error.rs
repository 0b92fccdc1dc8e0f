use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Tag errors
    #[error("Invalid tag UID: {0}")]
    InvalidUid(String),

    // Reader errors
    #[error("Unknown reader number {number}: expected {min}-{max}")]
    UnknownReader { number: u8, min: u8, max: u8 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

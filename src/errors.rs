use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the intake domain, storage and configuration layers.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntakeError {
    /// Message without the category prefix, for user-facing text.
    pub fn detail(&self) -> &str {
        match self {
            IntakeError::StorageError(message)
            | IntakeError::ConfigError(message)
            | IntakeError::InvalidInput(message) => message,
        }
    }
}

pub type Result<T> = StdResult<T, IntakeError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] IntakeError),
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        IntakeError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for IntakeError {
    fn from(err: csv::Error) -> Self {
        IntakeError::StorageError(err.to_string())
    }
}

//! Error types for the TJPA crawler

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for TJPA operations
pub type Result<T> = std::result::Result<T, TjpaError>;

/// Main error type for TJPA
#[derive(Error, Debug)]
pub enum TjpaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The checkpoint file exists but does not hold a base-10 integer.
    #[error("Corrupt checkpoint at {}: {content:?} is not a sequential number", .path.display())]
    CorruptCheckpoint { path: PathBuf, content: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl TjpaError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Whether the run must stop because the stored cursor is unusable
    pub fn is_corrupt_checkpoint(&self) -> bool {
        matches!(self, Self::CorruptCheckpoint { .. })
    }
}

//! Error types for dllwatch

use std::fmt;
use std::io::{self, ErrorKind};
use thiserror::Error;

/// Error types for dllwatch operations
///
/// Only startup problems surface as a `WatchError`. Per-file copy problems
/// are carried as [`CopyFailure`] values and never stop the watch loop.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pair line without the `>` separator
    #[error("Configuration error on line {line_number}: missing '>' separator in {line:?}")]
    MissingSeparator { line_number: usize, line: String },

    /// A pair line whose source or destination is empty after trimming
    #[error("Configuration error on line {line_number}: empty source or destination in {line:?}")]
    EmptyPath { line_number: usize, line: String },

    /// A pair line whose source and destination are the same path
    #[error("Configuration error on line {line_number}: source and destination are the same file in {line:?}")]
    SamePath { line_number: usize, line: String },

    /// Settings file could not be read or parsed
    #[error("Settings error: {0}")]
    Settings(String),
}

impl WatchError {
    /// Check if this error comes from malformed configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            WatchError::Config(_)
                | WatchError::MissingSeparator { .. }
                | WatchError::EmptyPath { .. }
                | WatchError::SamePath { .. }
                | WatchError::Settings(_)
        )
    }
}

/// Why a single copy attempt was rejected by the platform.
///
/// Stored as the last known error of a pending pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl CopyFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<io::Error> for CopyFailure {
    fn from(err: io::Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

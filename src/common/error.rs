//! Error types for the UI harness
//!
//! Every failure propagates to the caller unchanged. Nothing is retried.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the UI harness
#[derive(Error, Debug)]
pub enum Error {
    // === Lifecycle Errors ===
    #[error("Failed to launch target '{program}': {reason}")]
    LaunchFailed { program: String, reason: String },

    #[error("Cannot {action} while harness is {state}")]
    InvalidState { action: String, state: String },

    // === Channel Errors ===
    #[error("Failed to send '{command}' to target: {source}. The target may have exited")]
    ChannelWrite {
        command: String,
        #[source]
        source: io::Error,
    },

    // === Protocol Errors ===
    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a launch failure for the given program
    pub fn launch_failed(program: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::LaunchFailed {
            program: program.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a channel write error for a command
    pub fn channel_write(command: impl std::fmt::Display, source: io::Error) -> Self {
        Self::ChannelWrite {
            command: command.to_string(),
            source,
        }
    }

    /// Whether the target closed its end of the input pipe
    pub fn is_broken_pipe(&self) -> bool {
        matches!(
            self,
            Self::ChannelWrite { source, .. } if source.kind() == io::ErrorKind::BrokenPipe
        )
    }
}

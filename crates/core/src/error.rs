//! Error types for the Go plugin.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, GlideError>;

/// Main error type for detection and command execution.
#[derive(Debug, Error)]
pub enum GlideError {
    #[error("Failed to enumerate project root {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown command")]
    UnknownCommand(String),

    #[error("empty command")]
    EmptyCommand(String),

    #[error("{message}")]
    Spawn { command: String, message: String },

    #[error("cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlideError {
    /// Stable token identifying the error kind on the wire and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GlideError::Filesystem { .. } => "filesystem-error",
            GlideError::UnknownCommand(_) => "unknown-command",
            GlideError::EmptyCommand(_) => "empty-command",
            GlideError::Spawn { .. } => "spawn-failed",
            GlideError::Cancelled => "cancelled",
            GlideError::Io(_) => "io-error",
        }
    }
}

//! Error types for the tools.

use std::path::PathBuf;

use tactics_core::error::TacticsError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The engine rejected a map, config or command.
    #[error(transparent)]
    Tactics(#[from] TacticsError),

    /// A field argument was not `x,y`.
    #[error("Invalid field '{0}', expected x,y")]
    InvalidField(String),

    /// One or more files failed validation.
    #[error("{failed} of {total} data files failed validation")]
    ValidationFailed {
        /// Files with errors.
        failed: usize,
        /// Files checked.
        total: usize,
    },

    /// Output could not be encoded as JSON.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

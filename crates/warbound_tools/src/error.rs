//! Tool errors.

use std::path::PathBuf;

use thiserror::Error;
use warbound_core::error::GameError;

/// Errors raised by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The rules engine rejected the input.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A configuration parsed but describes an unplayable game.
    #[error("{}: {}", path.display(), problems.join("; "))]
    Invalid {
        /// The offending file.
        path: PathBuf,
        /// Every problem found.
        problems: Vec<String>,
    },

    /// JSON output failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for the tools.
pub type Result<T> = std::result::Result<T, ToolError>;

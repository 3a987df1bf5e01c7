//! Error types for the rules engine.
//!
//! Setup errors (`InvalidDimensions`, `MapFormat`, `MissingTerrain`,
//! `DataParseError`) abort initialization. Every other variant is a per-command
//! rejection: the command is a no-op and state is left untouched.

use thiserror::Error;

use crate::grid::Cell;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all rules engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Board dimensions must both be positive and cover at most
    /// [`crate::terrain::MAX_CELLS`] cells.
    #[error("Invalid board dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Requested row count.
        rows: i64,
        /// Requested column count.
        cols: i64,
    },

    /// A layout contained an unrecognized symbol or a ragged row.
    #[error("Map format error at row {row}, column {col}: {message}")]
    MapFormat {
        /// Zero-based row of the offending line.
        row: usize,
        /// Zero-based column of the offending symbol.
        col: usize,
        /// Description of the problem.
        message: String,
    },

    /// A valid cell has no terrain assigned.
    #[error("No terrain mapped for cell {0}")]
    MissingTerrain(Cell),

    /// Cell lies outside the board.
    #[error("Cell {0} is out of bounds")]
    OutOfBounds(Cell),

    /// No eligible unit at the given cell, or a unit was placed off the board.
    #[error("Invalid position {cell}: {reason}")]
    InvalidPosition {
        /// The offending cell.
        cell: Cell,
        /// Why the position was rejected.
        reason: String,
    },

    /// Movement budget was negative or not a number.
    #[error("Invalid movement budget: {0}")]
    InvalidBudget(String),

    /// The command is not allowed in the current state.
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    /// Formation is not available to this unit kind.
    #[error("Formation '{formation}' is not available to {unit}")]
    UnknownFormation {
        /// Formation display name.
        formation: String,
        /// Unit kind display name.
        unit: String,
    },

    /// Configuration data failed to parse.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source (file path or label).
        source_name: String,
        /// Error message.
        message: String,
    },
}

impl GameError {
    /// Shorthand for an [`GameError::IllegalAction`].
    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        Self::IllegalAction(message.into())
    }

    /// Shorthand for an [`GameError::InvalidPosition`].
    pub(crate) fn invalid_position(cell: Cell, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            cell,
            reason: reason.into(),
        }
    }

    /// Whether this error is fatal at setup rather than a rejected command.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. }
                | Self::MapFormat { .. }
                | Self::MissingTerrain(_)
                | Self::DataParseError { .. }
        )
    }
}

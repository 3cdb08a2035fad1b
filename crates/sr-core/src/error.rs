//! Error types for the selection engine.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the selection engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The dice table has no faces to roll.
    #[error("dice table is empty")]
    EmptyDiceTable,

    /// Decision text was empty after trimming.
    #[error("decision text must not be empty")]
    EmptyDecision,

    /// A 1-based decision position was outside the list.
    #[error("no decision at position {position} (list has {len})")]
    PositionOutOfRange {
        /// The requested 1-based position.
        position: usize,
        /// Number of decisions in the list.
        len: usize,
    },

    /// Preset names must contain something besides whitespace.
    #[error("preset name must not be empty")]
    EmptyPresetName,
}

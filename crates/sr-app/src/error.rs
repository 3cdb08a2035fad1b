//! Error types for the application layer.

use sr_core::{CoreError, ValidationReport};
use thiserror::Error;

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced to the front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// Engine error.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// A settings edit was rejected and nothing was saved.
    #[error("invalid settings: {0}")]
    Validation(ValidationReport),

    /// No preset matches the given name or id.
    #[error("no preset named '{0}'")]
    UnknownPreset(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("record encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ValidationReport> for AppError {
    fn from(report: ValidationReport) -> Self {
        Self::Validation(report)
    }
}

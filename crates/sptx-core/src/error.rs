//! Error types for SPTX core types.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while validating domain input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// A ticket snapshot is missing a required field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A monetary amount is out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

//! Error types for SPTX storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Key that was looked up.
        id: String,
    },

    /// A conditional write was rejected.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

impl StoreError {
    /// A missing reference record.
    #[must_use]
    pub fn reference_not_found(reference: &sptx_core::Reference) -> Self {
        Self::NotFound {
            entity: "reference",
            id: reference.to_string(),
        }
    }
}

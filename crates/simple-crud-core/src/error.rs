//! Error types for simple-crud

use thiserror::Error;

/// Core error type for storage and configuration operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    /// A statement was rejected because another row still references the target.
    ///
    /// Drivers must report this separately from [`CoreError::Query`] so callers
    /// can recover from it.
    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Whether this error is a foreign key violation
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, CoreError::ForeignKeyViolation(_))
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

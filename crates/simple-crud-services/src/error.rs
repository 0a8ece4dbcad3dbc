use simple_crud_core::CoreError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A looked-up row does not exist
    #[error("{0}")]
    NotFound(String),

    /// Untrusted input (id, page, column) was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The row is still referenced by rows of another table
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Table operation failed: {0}")]
    TableOperationFailed(String),
}

impl ServiceError {
    /// Errors caused by the caller's input rather than by storage.
    ///
    /// Hosts answer these with a 4xx-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_) | ServiceError::InvalidArgument(_)
        )
    }
}

impl From<CoreError> for ServiceError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::ForeignKeyViolation(message) => ServiceError::ConstraintViolation(message),
            other => ServiceError::TableOperationFailed(other.to_string()),
        }
    }
}

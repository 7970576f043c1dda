use std::error::Error;
use thiserror::Error;

/// Result alias for card repository operations.
pub type StoreResult<T> = Result<T, RepositoryError>;

/// Error raised by card store backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("card store unreachable: {message}")]
    Unreachable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("card store denied the read: {message}")]
    Denied { message: String },
}

impl RepositoryError {
    /// Construct an unreachable error from any backend failure.
    pub fn unreachable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        RepositoryError::Unreachable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a denied error for reads rejected by the store.
    pub fn denied(message: impl Into<String>) -> Self {
        RepositoryError::Denied {
            message: message.into(),
        }
    }
}

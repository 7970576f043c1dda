use thiserror::Error;

use crate::dao::storage::RepositoryError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reading or watching the card store failed.
    #[error("card repository failure")]
    Repository(#[source] RepositoryError),
    /// Operation requires an authenticated session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        ServiceError::Repository(err)
    }
}

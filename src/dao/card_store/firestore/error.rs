//! Error types shared by the Firestore REST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::RepositoryError;

/// Convenient result alias returning [`FirestoreError`] failures.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Failures that can occur while interacting with the Firestore REST API.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// Required environment variable is missing.
    #[error("missing Firestore environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// An environment variable carries a value that cannot be parsed.
    #[error("invalid value `{value}` for `{var}`")]
    InvalidEnvVar { var: &'static str, value: String },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Firestore client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a document endpoint could not be sent.
    #[error("failed to send Firestore request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Firestore returned an unexpected status code for a document endpoint.
    #[error("unexpected Firestore response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode Firestore response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<FirestoreError> for RepositoryError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::RequestStatus { path, status }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                RepositoryError::denied(format!("Firestore rejected the read of `{path}` ({status})"))
            }
            other => {
                let message = other.to_string();
                RepositoryError::unreachable(message, other)
            }
        }
    }
}

//! Store contract errors
//!
//! Callers branch on [`is_not_found_error`] and [`is_bad_request_error`]
//! instead of matching variants. Storage failures pass through unchanged.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by every [`Store`](super::Store) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key absent or logically deleted.
    #[error("couldn't find value for key: {key}")]
    NotFound { key: String },

    /// Caller-supplied data violates a constraint.
    #[error("{message}")]
    BadRequest { message: String },

    /// Codec, scanner or log I/O failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        StoreError::BadRequest {
            message: message.into(),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "KALLBAZ_NOT_FOUND",
            StoreError::BadRequest { .. } => "KALLBAZ_BAD_REQUEST",
            StoreError::Storage(err) => err.code(),
        }
    }
}

/// Check if the error means the key has no live value.
pub fn is_not_found_error(err: &StoreError) -> bool {
    matches!(err, StoreError::NotFound { .. })
}

/// Check if the error was caused by invalid caller input.
pub fn is_bad_request_error(err: &StoreError) -> bool {
    matches!(err, StoreError::BadRequest { .. })
}

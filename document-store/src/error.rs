//! Store and repository error types, and the not-found mapping policy.
//!
//! [`StoreError`] is what a store client reports. [`RepositoryError`] is what repository
//! callers see: store not-found becomes [`RepositoryError::NotFound`] only where a result is
//! promised, a failed precondition becomes [`RepositoryError::ConcurrencyConflict`], and every
//! other store fault passes through unchanged as [`RepositoryError::Store`].

use std::fmt;

use thiserror::Error;

/// Faults reported by the underlying document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests, retry after {retry_after_ms} ms")]
    TooManyRequests { retry_after_ms: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// HTTP-equivalent status code of the fault.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::PreconditionFailed(_) => 412,
            StoreError::Conflict(_) => 409,
            StoreError::TooManyRequests { .. } => 429,
            StoreError::Unauthorized(_) => 401,
            StoreError::BadRequest(_) | StoreError::Serialization(_) => 400,
            StoreError::Transport(_) => 503,
        }
    }
}

/// Errors returned by repository operations.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Entity with id '{id}' was not found.")]
    NotFound {
        id: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("Entity with id '{id}' was modified concurrently; re-read it and retry with the new concurrency token")]
    ConcurrencyConflict {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(id: impl fmt::Display) -> Self {
        RepositoryError::NotFound {
            id: id.to_string(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, RepositoryError::ConcurrencyConflict { .. })
    }

    /// Maps a failed lookup of `id`: store not-found becomes [`RepositoryError::NotFound`].
    pub(crate) fn from_lookup(id: &str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::Store(source) if source.is_not_found() => RepositoryError::NotFound {
                id: id.to_string(),
                source: Some(source),
            },
            other => other,
        }
    }

    /// Maps a failed upsert of `id`: a failed precondition is a concurrency conflict.
    pub(crate) fn from_save(id: &str, err: StoreError) -> Self {
        match err {
            StoreError::PreconditionFailed(_) => RepositoryError::ConcurrencyConflict {
                id: id.to_string(),
                source: err,
            },
            other => RepositoryError::Store(other),
        }
    }
}

/// Absorbs store not-found on a point delete.
///
/// Returns `Ok(true)` when a document was removed and `Ok(false)` when it was already absent.
pub(crate) fn absorb_not_found(result: std::result::Result<(), StoreError>) -> std::result::Result<bool, StoreError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("rating repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data in {file}: {reason}")]
    CorruptedData { file: String, reason: String },

    #[error("repository task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

// Error types for the todo store and its storage media

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::TodoStore`] operations
#[derive(Debug, Error)]
pub enum TodoError {
    /// Adding a todo whose text is empty after trimming
    #[error("Todo text cannot be empty")]
    EmptyText,

    /// The newest stored id is already `i64::MAX`, so no larger id exists
    #[error("No todo id available after {0}")]
    IdsExhausted(i64),

    #[error("Invalid storage key: {0} (must be 1-64 alphanumeric chars with _/-)")]
    InvalidKey(String),

    #[error("Failed to encode todos: {0}")]
    Encode(#[from] serde_json::Error),

    /// The medium rejected a load or save. For saves, the in-memory change has already been applied.
    #[error("Failed to persist todos: {0}")]
    Persistence(#[from] MediumError),
}

/// Errors raised by a [`crate::Medium`] implementation
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, TodoError>;

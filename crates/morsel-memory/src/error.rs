//! Error types for the memory crate.

use thiserror::Error;

/// Errors that can occur in the memory crate.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Database connection or operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A uniqueness constraint was violated (e.g. duplicate signup email).
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

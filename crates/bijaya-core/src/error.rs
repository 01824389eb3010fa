//! Error types for bijaya-core

use thiserror::Error;

/// Result type alias using bijaya-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bijaya-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote store error (transport, auth, missing session)
    #[error("Remote error: {0}")]
    Remote(String),
}

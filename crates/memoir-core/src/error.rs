//! Error types for memoir.

use thiserror::Error;

/// Result type alias using memoir's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for memoir operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record store is not configured or not reachable
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Autobiography record not found
    #[error("Autobiography not found: {0}")]
    RecordNotFound(uuid::Uuid),

    /// Wizard session not found
    #[error("Wizard session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    /// Story generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Document export failed
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

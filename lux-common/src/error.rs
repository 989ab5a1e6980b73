//! Common error types for Lux

use thiserror::Error;

/// Common result type for Lux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Lux services
///
/// The variants map directly onto the HTTP error taxonomy: invalid input
/// is a 4xx, authorization failures are 401/403, missing documents are
/// 404, everything else is a 500. Every failure is terminal for the one
/// operation that produced it; nothing here is retried automatically.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller presented no identity where one is required
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Caller identity does not match the resource owner
    #[error("Unauthorized: {0}")]
    Forbidden(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Invalid input (bad store name, etc.).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

//! Data service error types.

use thiserror::Error;

use crypta_crypto::CryptoError;
use crypta_storage::StorageError;

/// Errors that can occur in the Data Service.
///
/// A missing record is not an error; lookups return `None` instead.
#[derive(Debug, Error)]
pub enum DataError {
    /// Caller input out of bounds.
    #[error("{field}: {message}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Encryption or decryption failed.
    ///
    /// Every cipher failure is reported through this variant, carrying the
    /// original cause.
    #[error("{0}")]
    Cryptography(#[source] CryptoError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

//! Validated plaintext input.

use crate::error::DataError;

/// Smallest accepted value, in UTF-8 bytes.
pub const MIN_VALUE_LEN: usize = 1;

/// Largest accepted value, in UTF-8 bytes.
///
/// One PKCS#1 v1.5 block of a 2048-bit key.
pub const MAX_VALUE_LEN: usize = 245;

/// A plaintext value submitted for creation or update.
///
/// Only constructible through [`NewValue::new`], so holding one means the
/// length bounds were checked.
#[derive(Clone, PartialEq, Eq)]
pub struct NewValue {
    data: String,
}

impl NewValue {
    /// Validates `data` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] unless `data` is 1 to 245 bytes long.
    pub fn new(data: impl Into<String>) -> Result<Self, DataError> {
        let data = data.into();

        if !(MIN_VALUE_LEN..=MAX_VALUE_LEN).contains(&data.len()) {
            return Err(DataError::Validation {
                field: "data",
                message: format!("size must be between {MIN_VALUE_LEN} and {MAX_VALUE_LEN}"),
            });
        }

        Ok(Self { data })
    }

    /// Returns the plaintext.
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

impl std::fmt::Debug for NewValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewValue")
            .field("len", &self.data.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

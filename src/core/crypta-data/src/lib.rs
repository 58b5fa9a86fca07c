//! # Crypta Data Service
//!
//! Stores values encrypted at rest and hands them back decrypted.
//!
//! ## Behavior
//!
//! - Values are encrypted before they reach the record store
//! - Reads by id decrypt; listing returns ciphertext as stored
//! - A missing record is `None`, never an error
//! - Every cipher failure surfaces as [`DataError::Cryptography`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod value;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crypta_crypto::AsymmetricCipher;
use crypta_storage::{Record, RecordId, RecordStore};

pub use error::DataError;
pub use value::{NewValue, MAX_VALUE_LEN, MIN_VALUE_LEN};

/// Read/write operations over encrypted records.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Returns every record as stored (ciphertext), ordered by id.
    async fn list_data(&self) -> Result<Vec<Record>, DataError>;

    /// Finds a record and returns it with its value decrypted.
    ///
    /// Returns `Ok(None)` if no record has this id.
    async fn get_decrypted_data(&self, id: RecordId) -> Result<Option<Record>, DataError>;

    /// Encrypts a value and stores it as a new record.
    ///
    /// Returns the stored record (ciphertext form) with its assigned id.
    async fn save_data(&self, value: NewValue) -> Result<Record, DataError>;

    /// Encrypts a value and replaces the record at `id` with it.
    ///
    /// Returns `Ok(None)` without encrypting or writing anything if no
    /// record has this id.
    async fn update_data_value(
        &self,
        id: RecordId,
        value: NewValue,
    ) -> Result<Option<Record>, DataError>;
}

/// The Data Engine wires a record store to a cipher.
pub struct DataEngine {
    store: Arc<dyn RecordStore>,
    cipher: Arc<dyn AsymmetricCipher>,
}

impl DataEngine {
    /// Creates a new DataEngine over the given store and cipher.
    pub fn new(store: Arc<dyn RecordStore>, cipher: Arc<dyn AsymmetricCipher>) -> Self {
        let max_plaintext_len = cipher.max_plaintext_len();
        if max_plaintext_len < MAX_VALUE_LEN {
            warn!(
                max_plaintext_len,
                max_value_len = MAX_VALUE_LEN,
                "Cipher block is smaller than the accepted value size"
            );
        }

        info!("Data engine initialized");

        Self { store, cipher }
    }

    fn encrypt(&self, value: &NewValue) -> Result<String, DataError> {
        self.cipher.encrypt(value.as_str()).map_err(|e| {
            warn!(error = %e, "Encryption failed");
            DataError::Cryptography(e)
        })
    }
}

#[async_trait]
impl DataService for DataEngine {
    async fn list_data(&self) -> Result<Vec<Record>, DataError> {
        Ok(self.store.find_all().await?)
    }

    async fn get_decrypted_data(&self, id: RecordId) -> Result<Option<Record>, DataError> {
        let Some(record) = self.store.find_by_id(id).await? else {
            debug!(id, "Record not found");
            return Ok(None);
        };

        let plaintext = self.cipher.decrypt(&record.data).map_err(|e| {
            warn!(id, error = %e, "Decryption failed");
            DataError::Cryptography(e)
        })?;

        debug!(id, "Record decrypted");
        Ok(Some(Record::new(id, plaintext)))
    }

    async fn save_data(&self, value: NewValue) -> Result<Record, DataError> {
        let ciphertext = self.encrypt(&value)?;
        let record = self.store.save(None, ciphertext).await?;

        info!(id = record.id, "Record created");
        Ok(record)
    }

    async fn update_data_value(
        &self,
        id: RecordId,
        value: NewValue,
    ) -> Result<Option<Record>, DataError> {
        if !self.store.exists_by_id(id).await? {
            debug!(id, "Record not found, nothing to update");
            return Ok(None);
        }

        let ciphertext = self.encrypt(&value)?;
        let record = self.store.save(Some(id), ciphertext).await?;

        info!(id, "Record updated");
        Ok(Some(record))
    }
}

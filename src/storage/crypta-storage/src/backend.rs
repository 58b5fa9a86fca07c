//! Record store trait definition.

use async_trait::async_trait;

use crate::error::StorageError;

/// Identifier assigned to a record by its store.
pub type RecordId = i64;

/// One persisted `{id, data}` pair.
///
/// `data` is opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Stored payload.
    pub data: String,
}

impl Record {
    /// Creates a record.
    pub fn new(id: RecordId, data: impl Into<String>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }
}

/// Record store trait for implementing different storage engines.
///
/// Stores provide no transactions and no conflict detection: concurrent
/// saves to one id are last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record, ordered by id.
    async fn find_all(&self) -> Result<Vec<Record>, StorageError>;

    /// Gets a record by id.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, StorageError>;

    /// Saves a record.
    ///
    /// With `id: None` the store assigns a fresh id. With `Some(id)` the
    /// record at that id is replaced, or created if absent.
    async fn save(&self, id: Option<RecordId>, data: String) -> Result<Record, StorageError>;

    /// Checks if a record exists.
    async fn exists_by_id(&self, id: RecordId) -> Result<bool, StorageError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

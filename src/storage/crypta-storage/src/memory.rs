//! In-memory record store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{Record, RecordId, RecordStore};
use crate::error::StorageError;

/// Record store held in process memory.
///
/// Ids start at 1 and are never handed out again, even if a record was
/// saved at an explicit id above the counter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<RecordId, String>,
    last_id: RecordId,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Record>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .map(|(id, data)| Record::new(*id, data.clone()))
            .collect())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id).map(|data| Record::new(id, data.clone())))
    }

    async fn save(&self, id: Option<RecordId>, data: String) -> Result<Record, StorageError> {
        let mut inner = self.inner.write().await;

        let id = match id {
            Some(id) => {
                inner.last_id = inner.last_id.max(id);
                id
            }
            None => {
                inner.last_id += 1;
                inner.last_id
            }
        };

        inner.records.insert(id, data.clone());
        Ok(Record::new(id, data))
    }

    async fn exists_by_id(&self, id: RecordId) -> Result<bool, StorageError> {
        Ok(self.inner.read().await.records.contains_key(&id))
    }
}

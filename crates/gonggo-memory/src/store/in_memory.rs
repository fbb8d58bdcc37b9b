use std::collections::HashMap;
use std::sync::RwLock;

use super::{BoxFuture, DocumentStore, newest_first};
use crate::document::{DocumentId, DocumentRecord};
use crate::error::StoreError;

/// Process-local store.
pub struct InMemoryStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("len", &self.len())
            .finish()
    }
}

fn poisoned() -> StoreError {
    StoreError::Io(std::io::Error::other("in-memory store lock poisoned"))
}

impl DocumentStore for InMemoryStore {
    fn put<'a>(&'a self, record: &'a DocumentRecord) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| poisoned())?;
            records.insert(record.id.storage_key(), record.clone());
            Ok(())
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<DocumentRecord>, StoreError>> {
        Box::pin(async move {
            let records = self.records.read().map_err(|_| poisoned())?;
            Ok(records.get(&id.storage_key()).cloned())
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<DocumentRecord>, StoreError>> {
        Box::pin(async move {
            let mut out: Vec<DocumentRecord> = {
                let records = self.records.read().map_err(|_| poisoned())?;
                records.values().cloned().collect()
            };
            newest_first(&mut out);
            Ok(out)
        })
    }

    fn remove<'a>(&'a self, id: &'a DocumentId) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| poisoned())?;
            Ok(records.remove(&id.storage_key()).is_some())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| poisoned())?;
            let count = records.len();
            records.clear();
            Ok(count)
        })
    }
}

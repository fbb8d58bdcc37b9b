//! Key-value persistence of [`DocumentRecord`]s, keyed `document_<id>`.

mod file;
mod in_memory;

use std::future::Future;
use std::pin::Pin;

pub use file::FileStore;
pub use in_memory::InMemoryStore;

use crate::document::{DocumentId, DocumentRecord};
use crate::error::StoreError;

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait DocumentStore: Send + Sync {
    /// Insert or replace the record under its id.
    fn put<'a>(&'a self, record: &'a DocumentRecord) -> BoxFuture<'a, Result<(), StoreError>>;

    fn get<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<DocumentRecord>, StoreError>>;

    /// All records, newest first.
    fn list(&self) -> BoxFuture<'_, Result<Vec<DocumentRecord>, StoreError>>;

    /// Returns `true` when a record was removed.
    fn remove<'a>(&'a self, id: &'a DocumentId) -> BoxFuture<'a, Result<bool, StoreError>>;

    /// Remove every record and return how many were deleted.
    fn clear(&self) -> BoxFuture<'_, Result<usize, StoreError>>;
}

pub(crate) fn newest_first(records: &mut [DocumentRecord]) {
    records.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.millis().cmp(&a.id.millis()))
    });
}

use std::path::{Path, PathBuf};

use super::{BoxFuture, DocumentStore, newest_first};
use crate::document::{DocumentId, DocumentRecord};
use crate::error::StoreError;

const KEY_PREFIX: &str = "document_";

/// One JSON file per record: `<dir>/document_<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating `dir` when missing.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "document store opened");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &DocumentId) -> PathBuf {
        self.dir.join(format!("{}.json", id.storage_key()))
    }

    async fn entries(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut out = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(KEY_PREFIX) && n.ends_with(".json"));
            if is_record {
                out.push(path);
            }
        }
        Ok(out)
    }
}

async fn read_record(path: &Path) -> Result<DocumentRecord, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        key: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_owned(),
        source,
    })
}

impl DocumentStore for FileStore {
    fn put<'a>(&'a self, record: &'a DocumentRecord) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let path = self.path_for(&record.id);
            let json = serde_json::to_vec_pretty(record)?;
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, json).await?;
            tokio::fs::rename(&tmp, &path).await?;
            tracing::debug!(key = %record.id.storage_key(), "record stored");
            Ok(())
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<DocumentRecord>, StoreError>> {
        Box::pin(async move {
            let path = self.path_for(id);
            if !tokio::fs::try_exists(&path).await? {
                return Ok(None);
            }
            read_record(&path).await.map(Some)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<DocumentRecord>, StoreError>> {
        Box::pin(async move {
            let mut records = Vec::new();
            for path in self.entries().await? {
                match read_record(&path).await {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!(path = %path.display(), "skipping record: {e}"),
                }
            }
            newest_first(&mut records);
            Ok(records)
        })
    }

    fn remove<'a>(&'a self, id: &'a DocumentId) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move {
            match tokio::fs::remove_file(self.path_for(id)).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        Box::pin(async move {
            let entries = self.entries().await?;
            for path in &entries {
                tokio::fs::remove_file(path).await?;
            }
            tracing::info!(count = entries.len(), "document store cleared");
            Ok(entries.len())
        })
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::{Collection, Record};

/// Durable backing for collections.
///
/// A backend loads and persists whole collections; the store layers
/// validation, id assignment, and per-collection serialization on top.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Current contents of a collection, in stored order.
    /// An absent container reads as an empty collection.
    async fn load(&self, collection: Collection) -> Result<Vec<Record>, StoreError>;

    /// Replace the persisted contents of a collection with the given
    /// snapshot. The full collection is written, not a delta.
    async fn persist(&self, collection: Collection, records: &[Record]) -> Result<(), StoreError>;
}

/// One pretty-printed JSON array file per collection under a data directory.
///
/// A missing file is treated as an empty collection and lazily created
/// with `[]` on first load. Malformed JSON is a [`StoreError::Storage`];
/// the backend never attempts to repair a corrupt file.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `data_dir`, creating the directory if needed.
    ///
    /// Failure to create the directory is a startup error; nothing else in
    /// the crate can proceed without it.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir).map_err(|err| {
            StoreError::Storage(format!(
                "cannot create data directory {}: {}",
                data_dir.display(),
                err
            ))
        })?;
        Ok(Self { data_dir })
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let path = self.path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, b"[]").await?;
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_slice(&bytes).map_err(|err| {
            StoreError::Storage(format!("malformed collection file {}: {}", collection, err))
        })
    }

    async fn persist(&self, collection: Collection, records: &[Record]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(self.path(collection), bytes).await?;
        tracing::debug!(collection = collection.name(), count = records.len(), "persisted");
        Ok(())
    }
}

/// In-memory backend for tests and lightweight embedding.
#[derive(Default)]
pub struct InMemoryBackend {
    collections: Mutex<HashMap<Collection, Vec<Record>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn load(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let guard = self.collections.lock().await;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    async fn persist(&self, collection: Collection, records: &[Record]) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().await;
        guard.insert(collection, records.to_vec());
        Ok(())
    }
}

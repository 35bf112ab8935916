use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::storage::{FileBackend, StorageBackend};
use crate::types::{Collection, Record, FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT};

/// Durable CRUD over named collections.
///
/// Every operation reloads the collection from the backend, mutates the
/// snapshot, and persists the full collection back. The read-modify-write
/// cycle is serialized per collection by an async mutex, so two concurrent
/// mutations on the same collection cannot lose each other's writes.
/// Operations on different collections proceed independently.
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    locks: HashMap<Collection, Mutex<()>>,
}

impl RecordStore {
    /// Open a store over JSON files under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::with_backend(Arc::new(FileBackend::new(data_dir)?)))
    }

    /// Build a store over any backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        let locks = Collection::ALL
            .iter()
            .map(|&c| (c, Mutex::new(())))
            .collect();
        Self { backend, locks }
    }

    fn lock(&self, collection: Collection) -> &Mutex<()> {
        // Every Collection variant is seeded in with_backend.
        &self.locks[&collection]
    }

    /// Current contents of a collection, in stored order.
    pub async fn list(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let _guard = self.lock(collection).lock().await;
        self.backend.load(collection).await
    }

    /// Validate, assign `id` and `createdAt`, persist, and return the new
    /// record. Validation happens before any persistence; a rejected create
    /// leaves the collection untouched.
    pub async fn create(
        &self,
        collection: Collection,
        mut fields: Record,
    ) -> Result<Record, StoreError> {
        let _guard = self.lock(collection).lock().await;
        let mut records = self.backend.load(collection).await?;

        let spec = collection.spec();
        for field in spec.required {
            if !has_value(&fields, field) {
                return Err(StoreError::Validation(format!(
                    "missing required field: {}",
                    field
                )));
            }
        }

        for field in spec.unique {
            if let Some(value) = fields.get(*field) {
                if records.iter().any(|r| r.get(*field) == Some(value)) {
                    return Err(StoreError::Conflict(format!(
                        "{} already registered",
                        field
                    )));
                }
            }
        }

        fields.insert(FIELD_ID.to_string(), Value::String(new_record_id()));
        fields.insert(
            FIELD_CREATED_AT.to_string(),
            Value::String(now_timestamp()),
        );

        records.push(fields.clone());
        self.backend.persist(collection, &records).await?;
        Ok(fields)
    }

    /// Linear scan by id.
    pub async fn get(&self, collection: Collection, id: &str) -> Result<Record, StoreError> {
        let _guard = self.lock(collection).lock().await;
        let records = self.backend.load(collection).await?;
        records
            .into_iter()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    /// Shallow-merge `patch` onto the record: patch keys overwrite,
    /// unspecified fields are retained, `id` and `createdAt` are protected.
    /// Stamps `updatedAt`, persists, and returns the merged record.
    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Record,
    ) -> Result<Record, StoreError> {
        let _guard = self.lock(collection).lock().await;
        let mut records = self.backend.load(collection).await?;

        let index = records
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        let record = &mut records[index];
        for (key, value) in patch {
            if key == FIELD_ID || key == FIELD_CREATED_AT {
                continue;
            }
            record.insert(key, value);
        }
        record.insert(
            FIELD_UPDATED_AT.to_string(),
            Value::String(now_timestamp()),
        );

        let merged = record.clone();
        self.backend.persist(collection, &records).await?;
        Ok(merged)
    }

    /// Remove the matching record and persist the remainder.
    /// Deleting an unknown id is a no-op that reports not-found.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock(collection).lock().await;
        let mut records = self.backend.load(collection).await?;

        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        if records.len() == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }

        self.backend.persist(collection, &records).await
    }
}

/// The `id` field of a record, when present and a string.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get(FIELD_ID).and_then(Value::as_str)
}

/// Required fields must be present and non-empty: null, `""`, and `[]`
/// all count as missing.
fn has_value(fields: &Record, field: &str) -> bool {
    match fields.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Random 128-bit record identifier, hex-encoded.
///
/// Collision-resistant without coordination, unlike the wall-clock-derived
/// generators this store replaces.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Millisecond-precision RFC3339 timestamp in UTC.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::error::StoreError;
use crate::hosts::{apply_host_defaults, Datm, HOST_DELETED};
use crate::registry::WebhookRegistry;
use crate::store::RecordStore;
use crate::storage::StorageBackend;
use crate::types::{Collection, EventName, Record, Subscription};

/// The operation surface a request router calls.
///
/// Wires the record store, webhook registry, and event dispatcher together
/// and applies the domain rules on top of the generic record contract:
/// host creation defaults, atomic DATM validation, and the `host.deleted`
/// notification. Mutations are committed and acknowledged before any
/// dispatch runs; delivery outcomes never reach the caller.
pub struct Platform {
    store: Arc<RecordStore>,
    registry: WebhookRegistry,
    dispatcher: Dispatcher,
}

impl Platform {
    /// Open a platform over JSON files under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(
            Arc::new(RecordStore::open(data_dir)?),
            DispatcherConfig::default(),
        ))
    }

    /// Build a platform over any storage backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(
            Arc::new(RecordStore::with_backend(backend)),
            DispatcherConfig::default(),
        )
    }

    pub fn new(store: Arc<RecordStore>, dispatcher_config: DispatcherConfig) -> Self {
        let registry = WebhookRegistry::new(store.clone());
        let dispatcher = Dispatcher::with_config(registry.clone(), dispatcher_config);
        Self {
            store,
            registry,
            dispatcher,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ── Users ────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<Record>, StoreError> {
        self.store.list(Collection::Users).await
    }

    /// Create a user. Requires non-empty `username` and `email`; the email
    /// must not already be registered.
    pub async fn create_user(&self, body: Value) -> Result<Record, StoreError> {
        let mut fields = object_fields(body)?;
        fields
            .entry("hosts".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        self.store.create(Collection::Users, fields).await
    }

    // ── Hosts ────────────────────────────────────────────────

    pub async fn list_hosts(&self) -> Result<Vec<Record>, StoreError> {
        self.store.list(Collection::Hosts).await
    }

    /// Create a host. Requires non-empty `name` and `creatorId`; everything
    /// else falls back to the creation defaults (draft status, balanced
    /// DATM, stock prompts).
    pub async fn create_host(&self, body: Value) -> Result<Record, StoreError> {
        let mut fields = object_fields(body)?;
        if let Some(datm) = fields.get("datm") {
            Datm::from_value(datm)?;
        }
        apply_host_defaults(&mut fields);
        self.store.create(Collection::Hosts, fields).await
    }

    pub async fn get_host(&self, id: &str) -> Result<Record, StoreError> {
        self.store.get(Collection::Hosts, id).await
    }

    /// Shallow-merge `patch` onto the host. A `datm` field inside the patch
    /// is validated whole before anything is written.
    pub async fn update_host(&self, id: &str, patch: Value) -> Result<Record, StoreError> {
        let patch = object_fields(patch)?;
        if let Some(datm) = patch.get("datm") {
            Datm::from_value(datm)?;
        }
        self.store.update(Collection::Hosts, id, patch).await
    }

    /// Replace the host's knowledge matrix. All four axes must be present
    /// and in range or the update is rejected with the stored scores
    /// untouched.
    pub async fn update_datm(&self, id: &str, datm: Value) -> Result<Datm, StoreError> {
        let datm = Datm::from_value(&datm)?;

        let mut patch = Record::new();
        patch.insert("datm".to_string(), serde_json::to_value(datm)?);
        self.store.update(Collection::Hosts, id, patch).await?;
        Ok(datm)
    }

    /// Delete a host, then notify `host.deleted` subscribers with
    /// `{hostId}`. The delete is committed before dispatch; delivery
    /// failures never affect this result.
    pub async fn delete_host(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(Collection::Hosts, id).await?;
        self.dispatcher
            .dispatch_field(&EventName::from(HOST_DELETED), "hostId", id)
            .await;
        Ok(())
    }

    // ── Webhooks ─────────────────────────────────────────────

    /// Register a webhook subscription. The response is the only place the
    /// signing secret appears in cleartext.
    pub async fn create_webhook(&self, body: Value) -> Result<Subscription, StoreError> {
        let request: WebhookRequest = serde_json::from_value(body)
            .map_err(|err| StoreError::Validation(format!("invalid subscription: {}", err)))?;
        self.registry
            .create(&request.url, request.events, request.secret)
            .await
    }

    pub async fn list_webhooks(&self) -> Result<Vec<Subscription>, StoreError> {
        self.registry.list().await
    }

    pub async fn delete_webhook(&self, id: &str) -> Result<(), StoreError> {
        self.registry.delete(id).await
    }
}

#[derive(Debug, Deserialize)]
struct WebhookRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    events: Vec<String>,
    secret: Option<String>,
}

fn object_fields(body: Value) -> Result<Record, StoreError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::Validation(
            "request body must be a JSON object".to_string(),
        )),
    }
}

//! Flat-file content platform core: record store, webhook registry,
//! signed event dispatch.
//!
//! This crate provides the **durable, single-process, best-effort** core of
//! a "digital host" builder: JSON-file collections with CRUD and
//! per-collection constraints, webhook subscriptions with write-once-visible
//! secrets, and fire-and-forget HMAC-signed notifications on selected
//! mutations.
//!
//! ## Guarantees
//! - Per-collection write serialization (no lost updates within a process)
//! - Validation before persistence (no partial writes)
//! - At-most-once, best-effort notification delivery
//! - Secrets returned in cleartext exactly once
//!
//! ## Non-Guarantees
//! - Cross-process coordination on the data directory
//! - Delivery retries, ordering, or durability of delivery attempts
//! - Transactions spanning collections
//!
//! This crate is intentionally **not a hosted service**. Request routing and
//! presentation live elsewhere; the [`Platform`] facade exposes the
//! operations a router calls and [`response`] the envelope it returns.

mod dispatcher;
mod error;
mod hosts;
mod platform;
mod registry;
pub mod response;
mod signing;
mod storage;
mod store;
mod types;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{DeliveryOutcome, FailureReason, StoreError};
pub use hosts::{apply_host_defaults, Datm, HOST_DELETED};
pub use platform::Platform;
pub use registry::{WebhookRegistry, SECRET_PLACEHOLDER};
pub use response::ApiResponse;
pub use signing::{
    compute_signature, parse_notification_headers, verify_notification, verify_signature,
    ParsedHeaders, VerificationError,
};
pub use storage::{FileBackend, InMemoryBackend, StorageBackend};
pub use store::{record_id, RecordStore};
pub use types::{
    Collection, CollectionSpec, EventEnvelope, EventName, Record, Subscription,
    SubscriptionStatus, FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT,
};

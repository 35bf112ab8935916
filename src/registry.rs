use std::sync::Arc;

use rand::RngCore;
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::store::RecordStore;
use crate::types::{Collection, EventName, Record, Subscription, SubscriptionStatus};

/// Shown in place of a non-empty secret on every read after creation.
pub const SECRET_PLACEHOLDER: &str = "***";

/// Webhook subscriptions as a specialized store collection.
///
/// Adds secret generation and redaction on top of the generic record
/// contract: the cleartext secret leaves this module exactly once, in the
/// return value of [`WebhookRegistry::create`].
#[derive(Clone)]
pub struct WebhookRegistry {
    store: Arc<RecordStore>,
}

impl WebhookRegistry {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Register a subscription. Requires a non-empty `url` and a non-empty
    /// `events` set; generates a 256-bit hex secret when none is supplied.
    ///
    /// The returned subscription carries the secret in cleartext; callers
    /// are expected to hand it to the subscriber and forget it.
    pub async fn create(
        &self,
        url: &str,
        events: Vec<String>,
        secret: Option<String>,
    ) -> Result<Subscription, StoreError> {
        let mut deduped: Vec<String> = Vec::with_capacity(events.len());
        for event in events {
            if !deduped.contains(&event) {
                deduped.push(event);
            }
        }

        let secret = secret.unwrap_or_else(generate_secret);

        let mut fields = Record::new();
        fields.insert("url".to_string(), json!(url));
        fields.insert("events".to_string(), json!(deduped));
        fields.insert("secret".to_string(), json!(secret));
        fields.insert(
            "status".to_string(),
            serde_json::to_value(SubscriptionStatus::Active)?,
        );

        let record = self.store.create(Collection::Webhooks, fields).await?;
        parse_subscription(record)
    }

    /// All subscriptions, with non-empty secrets masked.
    pub async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        let records = self.store.list(Collection::Webhooks).await?;
        let mut subscriptions = Vec::with_capacity(records.len());
        for record in records {
            let mut subscription = parse_subscription(record)?;
            if !subscription.secret.is_empty() {
                subscription.secret = SECRET_PLACEHOLDER.to_string();
            }
            subscriptions.push(subscription);
        }
        Ok(subscriptions)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(Collection::Webhooks, id).await
    }

    /// The active subscriptions listening for `event`, secrets intact.
    ///
    /// Only the dispatcher consumes this; inactive or non-matching
    /// subscriptions are never selected for delivery.
    pub async fn matching(&self, event: &EventName) -> Result<Vec<Subscription>, StoreError> {
        let records = self.store.list(Collection::Webhooks).await?;
        let mut matched = Vec::new();
        for record in records {
            let subscription = parse_subscription(record)?;
            if subscription.wants(event) {
                matched.push(subscription);
            }
        }
        Ok(matched)
    }
}

fn parse_subscription(record: Record) -> Result<Subscription, StoreError> {
    serde_json::from_value(Value::Object(record)).map_err(|err| {
        StoreError::Storage(format!("malformed subscription record: {}", err))
    })
}

/// 256-bit signing key from the OS CSPRNG, hex-encoded.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

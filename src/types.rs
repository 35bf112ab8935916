use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry in a collection: a mapping of named fields to JSON values.
///
/// Records are schemaless at the store level; collection-specific
/// constraints are enforced per [`CollectionSpec`].
pub type Record = Map<String, Value>;

/// Field assigned at creation, immutable afterwards.
pub const FIELD_ID: &str = "id";

/// Creation timestamp field, stamped by the store.
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Refresh timestamp field, stamped on every update.
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// The named collections backed by one persisted JSON array each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Hosts,
    Webhooks,
    Sessions,
}

impl Collection {
    /// Every collection the platform persists.
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Hosts,
        Collection::Webhooks,
        Collection::Sessions,
    ];

    /// File name of the persisted JSON array for this collection.
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Hosts => "hosts.json",
            Collection::Webhooks => "webhooks.json",
            Collection::Sessions => "sessions.json",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Hosts => "hosts",
            Collection::Webhooks => "webhooks",
            Collection::Sessions => "sessions",
        }
    }

    /// Per-collection validation constraints applied by the store on create.
    pub fn spec(self) -> CollectionSpec {
        match self {
            Collection::Users => CollectionSpec {
                required: &["username", "email"],
                unique: &["email"],
            },
            Collection::Hosts => CollectionSpec {
                required: &["name", "creatorId"],
                unique: &[],
            },
            Collection::Webhooks => CollectionSpec {
                required: &["url", "events"],
                unique: &[],
            },
            Collection::Sessions => CollectionSpec {
                required: &[],
                unique: &[],
            },
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Create-time constraints for one collection.
///
/// `required` fields must be present and non-empty; `unique` fields must not
/// collide with any existing record (case-sensitive comparison).
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub required: &'static [&'static str],
    pub unique: &'static [&'static str],
}

/// Name of a mutation event that subscriptions can listen for.
///
/// This is a strongly-typed wrapper to avoid accidental mixing
/// of event names with other string values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventName(pub String);

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName(name.to_string())
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery eligibility of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

/// A webhook registration: target URL, subscribed event names, signing secret.
///
/// The secret is write-once-visible: returned in cleartext exactly once on
/// creation, masked on every subsequent listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub url: String,
    pub events: Vec<String>,
    pub secret: String,
    pub status: SubscriptionStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Subscription {
    /// Whether this subscription should receive the given event.
    pub fn wants(&self, event: &EventName) -> bool {
        self.status == SubscriptionStatus::Active && self.events.iter().any(|e| e == &event.0)
    }
}

/// Outbound notification body: `{event, data, timestamp}`.
///
/// The dispatcher signs the serialized envelope, not the inner `data` alone,
/// so receivers verify exactly the bytes they were sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    pub data: Value,
    pub timestamp: String,
}

use std::time::Duration;

use serde_json::{json, Value};

use crate::error::{DeliveryOutcome, FailureReason};
use crate::registry::WebhookRegistry;
use crate::signing::compute_signature;
use crate::store::now_timestamp;
use crate::types::{EventEnvelope, EventName, Subscription};

#[cfg(feature = "metrics")]
fn metric_inc(name: &'static str) {
    metrics::increment_counter!(name);
}

#[cfg(not(feature = "metrics"))]
fn metric_inc(_name: &'static str) {}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum time allowed for a single delivery attempt.
    pub timeout: Duration,

    /// Header carrying the event name.
    pub event_header: String,

    /// Header carrying the hex HMAC-SHA256 of the body.
    pub signature_header: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            event_header: "X-Kai-Event".to_string(),
            signature_header: "X-Kai-Signature".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_event_header(mut self, header: impl Into<String>) -> Self {
        self.event_header = header.into();
        self
    }

    pub fn with_signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = header.into();
        self
    }
}

/// Best-effort, at-most-once notification of matching subscribers.
///
/// Dispatch is fire-and-forget: each matching subscription gets its own
/// detached delivery task, outcomes are logged and counted but never joined
/// back into caller-visible state. No retry, no backoff, no dead-lettering,
/// no ordering guarantee between subscribers.
pub struct Dispatcher {
    registry: WebhookRegistry,
    client: reqwest::Client,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: WebhookRegistry) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    pub fn with_config(registry: WebhookRegistry, config: DispatcherConfig) -> Self {
        Self {
            registry,
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Notify every active subscription listening for `event`.
    ///
    /// Returns the number of delivery tasks spawned. The caller's mutation
    /// is already committed by the time this runs; a registry read failure
    /// or any delivery failure is logged and swallowed.
    pub async fn dispatch(&self, event: &EventName, data: Value) -> usize {
        let subscriptions = match self.registry.matching(event).await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                tracing::error!(event = %event, error = %err, "subscription lookup failed");
                return 0;
            }
        };

        if subscriptions.is_empty() {
            return 0;
        }

        let envelope = EventEnvelope {
            event: event.0.clone(),
            data,
            timestamp: now_timestamp(),
        };
        let body = match serde_json::to_vec(&envelope) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(event = %event, error = %err, "envelope serialization failed");
                return 0;
            }
        };

        let spawned = subscriptions.len();
        for subscription in subscriptions {
            let client = self.client.clone();
            let config = self.config.clone();
            let body = body.clone();
            let event = envelope.event.clone();

            tokio::spawn(async move {
                let outcome = deliver(&client, &config, &subscription, &event, body).await;
                match &outcome {
                    DeliveryOutcome::Delivered => {
                        metric_inc("webhook.delivery.delivered");
                        tracing::info!(
                            event = %event,
                            url = %subscription.url,
                            subscription = %subscription.id,
                            "webhook delivered"
                        );
                    }
                    DeliveryOutcome::Failed(reason) => {
                        metric_inc("webhook.delivery.failed");
                        tracing::warn!(
                            event = %event,
                            url = %subscription.url,
                            subscription = %subscription.id,
                            reason = %reason,
                            "webhook delivery failed"
                        );
                    }
                }
            });
        }

        metric_inc("webhook.dispatch.completed");
        spawned
    }

    /// Shorthand for the single-field payloads the platform emits,
    /// e.g. `dispatch_field(event, "hostId", id)`.
    pub async fn dispatch_field(&self, event: &EventName, key: &str, value: &str) -> usize {
        self.dispatch(event, json!({ key: value })).await
    }
}

/// One HTTP delivery attempt: a single terminal transition to
/// delivered or failed.
async fn deliver(
    client: &reqwest::Client,
    config: &DispatcherConfig,
    subscription: &Subscription,
    event: &str,
    body: Vec<u8>,
) -> DeliveryOutcome {
    let signature = compute_signature(subscription.secret.as_bytes(), &body);

    let response = client
        .post(&subscription.url)
        .timeout(config.timeout)
        .header("Content-Type", "application/json")
        .header(config.event_header.as_str(), event)
        .header(config.signature_header.as_str(), signature)
        .body(body)
        .send()
        .await;

    match response {
        Ok(resp) => {
            if resp.status().is_success() {
                DeliveryOutcome::Delivered
            } else if resp.status().is_client_error() {
                DeliveryOutcome::Failed(FailureReason::ClientError)
            } else {
                DeliveryOutcome::Failed(FailureReason::RemoteError)
            }
        }
        Err(err) => {
            if err.is_timeout() {
                DeliveryOutcome::Failed(FailureReason::Timeout)
            } else {
                DeliveryOutcome::Failed(FailureReason::Network)
            }
        }
    }
}

use std::fmt;

use crate::types::Collection;

/// Errors surfaced by store, registry, and platform operations.
///
/// Every variant maps to a JSON error envelope with an HTTP-equivalent
/// status code; none of them should crash a long-lived caller.
#[derive(Debug)]
pub enum StoreError {
    /// Missing or invalid fields. Recoverable, reported to the caller.
    Validation(String),

    /// No record with the given id in the collection. A normal outcome.
    NotFound { collection: Collection, id: String },

    /// A unique field collides with an existing record.
    Conflict(String),

    /// Unreadable or corrupt persisted state. Fatal for the request;
    /// the store cannot self-heal.
    Storage(String),
}

impl StoreError {
    /// HTTP-equivalent status code for the JSON error envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::NotFound { .. } => 404,
            StoreError::Conflict(_) => 409,
            StoreError::Storage(_) => 500,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(msg) =>
                write!(f, "validation failed: {}", msg),
            StoreError::NotFound { collection, id } =>
                write!(f, "no record {} in {}", id, collection),
            StoreError::Conflict(msg) =>
                write!(f, "conflict: {}", msg),
            StoreError::Storage(msg) =>
                write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Final outcome of one delivery attempt.
///
/// Each attempt is a single terminal transition; outcomes are logged by the
/// dispatcher and never surfaced to the caller that triggered the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(FailureReason),
}

/// Reasons why an HTTP delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Network,
    RemoteError,
    ClientError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout =>
                write!(f, "request timed out"),
            FailureReason::Network =>
                write!(f, "network error"),
            FailureReason::RemoteError =>
                write!(f, "remote endpoint returned error"),
            FailureReason::ClientError =>
                write!(f, "client error (non-retryable)"),
        }
    }
}

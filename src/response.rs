use serde::Serialize;
use serde_json::{json, Value};

use crate::error::StoreError;

/// JSON envelope handed back to the router: a status code plus a body that
/// always carries `success`, with data under `data` (or a domain key such
/// as `datm`) on success and `error` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "success": true, "data": data }),
        }
    }

    /// Success with the payload under a domain-specific key.
    pub fn ok_under(key: &str, value: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "success": true, key: value }),
        }
    }

    /// Bare `{success: true}`, used by deletions.
    pub fn ok_empty() -> Self {
        Self {
            status: 200,
            body: json!({ "success": true }),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "success": false, "error": message.into() }),
        }
    }
}

impl From<&StoreError> for ApiResponse {
    fn from(err: &StoreError) -> Self {
        ApiResponse::error(err.status_code(), err.to_string())
    }
}

impl From<StoreError> for ApiResponse {
    fn from(err: StoreError) -> Self {
        ApiResponse::from(&err)
    }
}

/// Convert an operation result into the envelope, data under `data`.
pub fn respond<T: Serialize>(result: Result<T, StoreError>) -> ApiResponse {
    match result {
        Ok(data) => match serde_json::to_value(data) {
            Ok(value) => ApiResponse::ok(value),
            Err(err) => ApiResponse::error(500, err.to_string()),
        },
        Err(err) => ApiResponse::from(err),
    }
}

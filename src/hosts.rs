use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::types::Record;

/// Fired after a host record is deleted; payload is `{hostId}`.
pub const HOST_DELETED: &str = "host.deleted";

/// Four-axis knowledge-matrix score attached to a host record.
///
/// All four axes must be present and within [0, 100]; an update carrying
/// any out-of-range axis is rejected whole, leaving the stored scores
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datm {
    pub truth: i64,
    pub goodness: i64,
    pub beauty: i64,
    pub intelligence: i64,
}

impl Datm {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;

    pub fn validate(&self) -> Result<(), StoreError> {
        for (axis, score) in [
            ("truth", self.truth),
            ("goodness", self.goodness),
            ("beauty", self.beauty),
            ("intelligence", self.intelligence),
        ] {
            if !(Self::MIN..=Self::MAX).contains(&score) {
                return Err(StoreError::Validation(format!(
                    "{} must be between {} and {}, got {}",
                    axis,
                    Self::MIN,
                    Self::MAX,
                    score
                )));
            }
        }
        Ok(())
    }

    /// Parse and range-check an update payload in one step.
    pub fn from_value(value: &Value) -> Result<Self, StoreError> {
        let datm: Datm = serde_json::from_value(value.clone())
            .map_err(|err| StoreError::Validation(format!("invalid datm: {}", err)))?;
        datm.validate()?;
        Ok(datm)
    }
}

impl Default for Datm {
    fn default() -> Self {
        Self {
            truth: 50,
            goodness: 50,
            beauty: 50,
            intelligence: 50,
        }
    }
}

/// Fill in the optional host fields a creation request may omit.
/// Explicitly supplied values are kept as-is.
pub fn apply_host_defaults(fields: &mut Record) {
    let defaults = [
        ("description", json!("")),
        ("avatar", json!("")),
        ("domain", json!("general")),
        ("datm", serde_json::to_value(Datm::default()).expect("datm")),
        (
            "prompts",
            json!({
                "scheduler": "You are a scheduling agent...",
                "expert": "You are an expert agent...",
                "qa": "You are a question-answering agent...",
            }),
        ),
        ("cozeConfig", json!({})),
        ("status", json!("draft")),
        ("updatedAt", json!(crate::store::now_timestamp())),
    ];

    for (key, value) in defaults {
        fields.entry(key.to_string()).or_insert(value);
    }
}

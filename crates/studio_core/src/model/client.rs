//! Client domain model.
//!
//! # Invariants
//! - `phone`, when present, matches `+7 DDD DDD-DD-DD` exactly.
//! - `phone` is unique across all clients; absent/empty never collides.

use crate::model::{normalize_optional, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable store-assigned identifier for a client record.
pub type ClientId = i64;

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+7 \d{3} \d{3}-\d{2}-\d{2}$").expect("phone pattern is a valid regex")
});

/// Persisted client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Input shape for creating a client; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; unset fields keep their stored value.
///
/// A set field with empty text clears the stored value, matching the
/// read-modify-merge-write contract of repository updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Client {
    /// Applies a patch field-by-field onto this record.
    pub fn apply_patch(&mut self, patch: &ClientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = normalize_optional(phone.clone());
        }
        if let Some(email) = &patch.email {
            self.email = normalize_optional(email.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = normalize_optional(notes.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.phone.as_deref())
    }
}

impl NewClient {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.phone.as_deref())
    }
}

fn validate_fields(name: &str, phone: Option<&str>) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if let Some(phone) = phone {
        if !is_valid_phone(phone) {
            return Err(ValidationError::InvalidPhone(phone.to_string()));
        }
    }
    Ok(())
}

/// Empty input is allowed; anything else must match the full pattern.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || PHONE_PATTERN.is_match(phone)
}

//! Session domain model.
//!
//! # Invariants
//! - At most one session exists per exact (date, time) pair.
//! - `class_type` may reference a deleted class type; readers must fall
//!   back to the defaults in [`crate::model::class_type`].
//!
//! Dates are `YYYY-MM-DD` and times are `HH:MM` (24h) strings. Both shapes
//! are zero-padded, so lexicographic comparison is chronological; the core
//! deliberately compares these as strings rather than parsed values.

use crate::model::class_type::ClassTypeId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Stable store-assigned identifier for a session record.
pub type SessionId = i64;

/// Persisted session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Start time, `HH:MM` 24h.
    pub time: String,
    /// Referenced class type; `None` or dangling after certain deletions.
    pub class_type: Option<ClassTypeId>,
    pub trainer: String,
}

/// Input shape for creating a session; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub class_type: Option<ClassTypeId>,
    pub trainer: String,
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub class_type: Option<ClassTypeId>,
    #[serde(default)]
    pub trainer: Option<String>,
}

impl Session {
    pub fn apply_patch(&mut self, patch: &SessionPatch) {
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(time) = &patch.time {
            self.time = time.clone();
        }
        if let Some(class_type) = patch.class_type {
            self.class_type = Some(class_type);
        }
        if let Some(trainer) = &patch.trainer {
            self.trainer = trainer.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.date, &self.time, &self.trainer)
    }

    /// Whether this session starts strictly after `now`
    /// (`YYYY-MM-DD HH:MM`).
    pub fn starts_after(&self, now: &str) -> bool {
        format!("{} {}", self.date, self.time).as_str() > now
    }
}

impl NewSession {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.date, &self.time, &self.trainer)
    }
}

fn validate_fields(date: &str, time: &str, trainer: &str) -> Result<(), ValidationError> {
    if date.trim().is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    if time.trim().is_empty() {
        return Err(ValidationError::MissingField("time"));
    }
    if trainer.trim().is_empty() {
        return Err(ValidationError::MissingField("trainer"));
    }
    Ok(())
}

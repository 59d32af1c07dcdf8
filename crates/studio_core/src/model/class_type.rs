//! Class type domain model and fallback defaults for dangling references.

use crate::model::{normalize_optional, ValidationError};
use serde::{Deserialize, Serialize};

/// Stable store-assigned identifier for a class type record.
pub type ClassTypeId = i64;

pub const DURATION_MIN_MINUTES: u16 = 30;
pub const DURATION_MAX_MINUTES: u16 = 180;
pub const MAX_PARTICIPANTS_MIN: u16 = 1;
pub const MAX_PARTICIPANTS_MAX: u16 = 50;

/// Defaults applied when a session references a missing class type.
pub const DEFAULT_DURATION_MINUTES: u16 = 60;
pub const DEFAULT_CAPACITY: u16 = 10;
pub const UNKNOWN_CLASS_TYPE_NAME: &str = "Unknown type";

/// Persisted class type record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassType {
    pub id: ClassTypeId,
    pub name: String,
    /// Duration in minutes, 30-180.
    pub duration: u16,
    /// Session capacity, 1-50.
    pub max_participants: u16,
    pub description: Option<String>,
}

/// Input shape for creating a class type; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClassType {
    pub name: String,
    pub duration: u16,
    pub max_participants: u16,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTypePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<u16>,
    #[serde(default)]
    pub max_participants: Option<u16>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ClassType {
    pub fn apply_patch(&mut self, patch: &ClassTypePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(max_participants) = patch.max_participants {
            self.max_participants = max_participants;
        }
        if let Some(description) = &patch.description {
            self.description = normalize_optional(description.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.duration, self.max_participants)
    }
}

impl NewClassType {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.duration, self.max_participants)
    }
}

fn validate_fields(name: &str, duration: u16, max_participants: u16) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if !(DURATION_MIN_MINUTES..=DURATION_MAX_MINUTES).contains(&duration) {
        return Err(ValidationError::DurationOutOfRange(duration));
    }
    if !(MAX_PARTICIPANTS_MIN..=MAX_PARTICIPANTS_MAX).contains(&max_participants) {
        return Err(ValidationError::MaxParticipantsOutOfRange(max_participants));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_type(duration: u16, max_participants: u16) -> NewClassType {
        NewClassType {
            name: "Hatha".to_string(),
            duration,
            max_participants,
            description: None,
        }
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(class_type(30, 10).validate().is_ok());
        assert!(class_type(180, 10).validate().is_ok());
        assert_eq!(
            class_type(29, 10).validate(),
            Err(ValidationError::DurationOutOfRange(29))
        );
        assert_eq!(
            class_type(181, 10).validate(),
            Err(ValidationError::DurationOutOfRange(181))
        );
    }

    #[test]
    fn capacity_bounds_are_inclusive() {
        assert!(class_type(60, 1).validate().is_ok());
        assert!(class_type(60, 50).validate().is_ok());
        assert_eq!(
            class_type(60, 0).validate(),
            Err(ValidationError::MaxParticipantsOutOfRange(0))
        );
        assert_eq!(
            class_type(60, 51).validate(),
            Err(ValidationError::MaxParticipantsOutOfRange(51))
        );
    }
}

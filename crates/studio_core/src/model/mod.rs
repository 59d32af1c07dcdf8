//! Domain records for the four studio collections.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a store-assigned monotonic integer id.
//! - Optional text fields normalize empty input to `None`; an empty phone
//!   is valid and never participates in uniqueness checks.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod booking;
pub mod class_type;
pub mod client;
pub mod session;

/// Field-level validation failure, reported before any write is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidPhone(String),
    DurationOutOfRange(u16),
    MaxParticipantsOutOfRange(u16),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is missing or empty"),
            Self::InvalidPhone(phone) => write!(
                f,
                "invalid phone `{phone}`; expected format +7 900 123-45-67"
            ),
            Self::DurationOutOfRange(minutes) => write!(
                f,
                "duration {minutes} min is outside the allowed 30-180 range"
            ),
            Self::MaxParticipantsOutOfRange(count) => write!(
                f,
                "max participants {count} is outside the allowed 1-50 range"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Normalizes optional text input: trims and maps empty strings to `None`.
pub(crate) fn normalize_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, schedule and cascade calls into the single
//!   command/query surface the UI layer consumes.
//! - Keep callers decoupled from storage details.

pub mod studio;

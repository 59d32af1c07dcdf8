//! Core persistence and scheduling-conflict logic for the studio booking
//! tool. This crate is the single source of truth for business invariants:
//! phone uniqueness, slot conflicts, booking capacity and explicit
//! multi-way deletion of class types and clients.

pub mod calendar;
pub mod cascade;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use calendar::{escape_text, to_ics, CalendarEvent};
pub use cascade::{ClassTypeDeletion, ClientDeletion};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::booking::{Booking, BookingId, BookingsCount};
pub use model::class_type::{ClassType, ClassTypeId, ClassTypePatch, NewClassType};
pub use model::client::{Client, ClientId, ClientPatch, NewClient};
pub use model::session::{NewSession, Session, SessionId, SessionPatch};
pub use model::ValidationError;
pub use repo::booking_repo::{BookingRepository, SqliteBookingRepository};
pub use repo::class_type_repo::{ClassTypeRepository, SqliteClassTypeRepository};
pub use repo::client_repo::{ClientRepository, SqliteClientRepository};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::{end_time, sort_by_time, SessionView, END_TIME_SENTINEL};
pub use service::studio::Studio;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

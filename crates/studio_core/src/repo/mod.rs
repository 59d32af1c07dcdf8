//! Repository layer: per-collection validation-and-CRUD over the record
//! store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the four
//!   collections.
//! - Enforce domain invariants (phone uniqueness, time conflicts, booking
//!   capacity) before any SQL mutation.
//!
//! # Invariants
//! - A conflict or validation failure never partially writes.
//! - Repository APIs return semantic errors (`NotFound`, `TimeConflict`)
//!   in addition to store transport errors.

use crate::db::{migrations::latest_version, StoreError};
use crate::model::class_type::ClassTypeId;
use crate::model::client::ClientId;
use crate::model::session::SessionId;
use crate::model::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod booking_repo;
pub mod class_type_repo;
pub mod client_repo;
pub mod session_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error taxonomy for all four collections.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(StoreError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    /// Another client already owns this non-empty phone number.
    DuplicatePhone(String),
    /// Another class type already carries this name.
    DuplicateName(String),
    /// A session already exists at this exact (date, time) pair.
    TimeConflict {
        date: String,
        time: String,
    },
    /// The client already holds a booking for this session.
    DuplicateBooking {
        client_id: ClientId,
        session_id: SessionId,
    },
    /// The session is at capacity; no further bookings are accepted.
    SessionFull {
        session_id: SessionId,
        capacity: u16,
    },
    /// Cascade misconfiguration: the replacement class type is absent or
    /// is the type being deleted.
    InvalidReplacement(ClassTypeId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicatePhone(phone) => {
                write!(f, "a client with phone `{phone}` already exists")
            }
            Self::DuplicateName(name) => {
                write!(f, "a class type named `{name}` already exists")
            }
            Self::TimeConflict { date, time } => {
                write!(f, "a session already exists at {date} {time}")
            }
            Self::DuplicateBooking {
                client_id,
                session_id,
            } => write!(
                f,
                "client {client_id} is already booked into session {session_id}"
            ),
            Self::SessionFull {
                session_id,
                capacity,
            } => write!(f, "session {session_id} is full (capacity {capacity})"),
            Self::InvalidReplacement(id) => {
                write!(f, "class type {id} is not a valid replacement target")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(StoreError::Sqlite(value))
    }
}

/// Verifies that a connection has been migrated and carries the table and
/// columns a repository depends on. Called by every `try_new`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! Booking repository contract and SQLite implementation.
//!
//! # Invariants
//! - At most one booking per (client, session) pair.
//! - A booking is only accepted while the live count is below the session
//!   capacity; capacity falls back to the default when the session's class
//!   type is missing or dangling.

use crate::model::booking::{Booking, BookingId};
use crate::model::class_type::DEFAULT_CAPACITY;
use crate::model::client::ClientId;
use crate::model::session::SessionId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOOKING_COLUMNS: &[&str] = &["id", "client_id", "session_id", "booking_date"];

const BOOKING_SELECT_SQL: &str =
    "SELECT id, client_id, session_id, booking_date FROM bookings";

/// Repository interface for booking operations.
pub trait BookingRepository {
    fn add_booking(&self, client_id: ClientId, session_id: SessionId) -> RepoResult<BookingId>;
    fn get_booking(&self, id: BookingId) -> RepoResult<Option<Booking>>;
    fn bookings_for_client(&self, client_id: ClientId) -> RepoResult<Vec<Booking>>;
    fn bookings_for_session(&self, session_id: SessionId) -> RepoResult<Vec<Booking>>;
    fn bookings_count_for_session(&self, session_id: SessionId) -> RepoResult<u32>;
    fn client_session_booking(
        &self,
        client_id: ClientId,
        session_id: SessionId,
    ) -> RepoResult<Option<Booking>>;
    fn delete_booking(&self, id: BookingId) -> RepoResult<()>;
}

/// SQLite-backed booking repository.
pub struct SqliteBookingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookingRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "bookings", BOOKING_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Capacity of the session's class type, or the default when the
    /// reference is absent or dangling.
    fn session_capacity(&self, session_id: SessionId) -> RepoResult<u16> {
        let class_type: Option<i64> = self
            .conn
            .query_row(
                "SELECT class_type FROM sessions WHERE id = ?1;",
                [session_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound {
                entity: "session",
                id: session_id,
            })?;

        let Some(class_type) = class_type else {
            return Ok(DEFAULT_CAPACITY);
        };

        let capacity: Option<u16> = self
            .conn
            .query_row(
                "SELECT max_participants FROM class_types WHERE id = ?1;",
                [class_type],
                |row| row.get(0),
            )
            .optional()?;
        Ok(capacity.unwrap_or(DEFAULT_CAPACITY))
    }
}

impl BookingRepository for SqliteBookingRepository<'_> {
    fn add_booking(&self, client_id: ClientId, session_id: SessionId) -> RepoResult<BookingId> {
        if self.client_session_booking(client_id, session_id)?.is_some() {
            return Err(RepoError::DuplicateBooking {
                client_id,
                session_id,
            });
        }

        let capacity = self.session_capacity(session_id)?;
        let booked = self.bookings_count_for_session(session_id)?;
        if booked >= u32::from(capacity) {
            return Err(RepoError::SessionFull {
                session_id,
                capacity,
            });
        }

        self.conn.execute(
            "INSERT INTO bookings (client_id, session_id, booking_date)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000));",
            params![client_id, session_id],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_booking(&self, id: BookingId) -> RepoResult<Option<Booking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_booking_row(row)?));
        }
        Ok(None)
    }

    fn bookings_for_client(&self, client_id: ClientId) -> RepoResult<Vec<Booking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} WHERE client_id = ?1;"))?;
        let bookings = collect_bookings(stmt.query([client_id])?);
        bookings
    }

    fn bookings_for_session(&self, session_id: SessionId) -> RepoResult<Vec<Booking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} WHERE session_id = ?1;"))?;
        let bookings = collect_bookings(stmt.query([session_id])?);
        bookings
    }

    fn bookings_count_for_session(&self, session_id: SessionId) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM bookings WHERE session_id = ?1;",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn client_session_booking(
        &self,
        client_id: ClientId,
        session_id: SessionId,
    ) -> RepoResult<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOKING_SELECT_SQL} WHERE client_id = ?1 AND session_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![client_id, session_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_booking_row(row)?));
        }
        Ok(None)
    }

    fn delete_booking(&self, id: BookingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM bookings WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "booking",
                id,
            });
        }
        Ok(())
    }
}

fn collect_bookings(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Booking>> {
    let mut bookings = Vec::new();
    while let Some(row) = rows.next()? {
        bookings.push(parse_booking_row(row)?);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &Row<'_>) -> RepoResult<Booking> {
    Ok(Booking {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        session_id: row.get("session_id")?,
        booking_date: row.get("booking_date")?,
    })
}

//! Studio facade: the command/query surface over one open store handle.
//!
//! # Invariants
//! - The facade holds the single process-wide connection as an explicit
//!   context object; there is no ambient global lookup.
//! - Commands validate through repositories and fail fast before writing.

use crate::calendar::{self, CalendarEvent};
use crate::cascade::{self, ClassTypeDeletion, ClientDeletion};
use crate::model::booking::{Booking, BookingId, BookingsCount};
use crate::model::class_type::{ClassType, ClassTypeId, ClassTypePatch, NewClassType};
use crate::model::client::{Client, ClientId, ClientPatch, NewClient};
use crate::model::session::{NewSession, Session, SessionId, SessionPatch};
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::class_type_repo::{ClassTypeRepository, SqliteClassTypeRepository};
use crate::repo::client_repo::{ClientRepository, SqliteClientRepository};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::RepoResult;
use crate::schedule::{self, SessionView};
use rusqlite::Connection;

/// Use-case facade over the studio record store.
///
/// One instance per process, constructed around the connection returned by
/// [`crate::db::open_db`].
pub struct Studio<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Studio<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    // Clients

    pub fn add_client(&self, client: &NewClient) -> RepoResult<ClientId> {
        SqliteClientRepository::try_new(self.conn)?.add_client(client)
    }

    pub fn update_client(&self, id: ClientId, patch: &ClientPatch) -> RepoResult<Client> {
        SqliteClientRepository::try_new(self.conn)?.update_client(id, patch)
    }

    pub fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        SqliteClientRepository::try_new(self.conn)?.get_client(id)
    }

    pub fn list_clients(&self) -> RepoResult<Vec<Client>> {
        SqliteClientRepository::try_new(self.conn)?.list_clients()
    }

    /// Deletes a client and its bookings per the chosen strategy;
    /// `now` is `YYYY-MM-DD HH:MM`.
    pub fn delete_client(
        &self,
        id: ClientId,
        now: &str,
        strategy: ClientDeletion,
    ) -> RepoResult<()> {
        cascade::delete_client(self.conn, id, now, strategy)
    }

    pub fn client_bookings_count(&self, id: ClientId, now: &str) -> RepoResult<BookingsCount> {
        cascade::client_bookings_count(self.conn, id, now)
    }

    // Class types

    pub fn add_class_type(&self, class_type: &NewClassType) -> RepoResult<ClassTypeId> {
        SqliteClassTypeRepository::try_new(self.conn)?.add_class_type(class_type)
    }

    pub fn update_class_type(
        &self,
        id: ClassTypeId,
        patch: &ClassTypePatch,
    ) -> RepoResult<ClassType> {
        SqliteClassTypeRepository::try_new(self.conn)?.update_class_type(id, patch)
    }

    pub fn get_class_type(&self, id: ClassTypeId) -> RepoResult<Option<ClassType>> {
        SqliteClassTypeRepository::try_new(self.conn)?.get_class_type(id)
    }

    pub fn list_class_types(&self) -> RepoResult<Vec<ClassType>> {
        SqliteClassTypeRepository::try_new(self.conn)?.list_class_types()
    }

    pub fn class_type_usage_count(&self, id: ClassTypeId) -> RepoResult<u32> {
        SqliteClassTypeRepository::try_new(self.conn)?.usage_count(id)
    }

    /// Deletes a class type, resolving dependent sessions per the chosen
    /// strategy.
    pub fn delete_class_type(&self, id: ClassTypeId, strategy: ClassTypeDeletion) -> RepoResult<()> {
        cascade::delete_class_type(self.conn, id, strategy)
    }

    // Sessions

    pub fn add_session(&self, session: &NewSession) -> RepoResult<SessionId> {
        SqliteSessionRepository::try_new(self.conn)?.add_session(session)
    }

    pub fn update_session(&self, id: SessionId, patch: &SessionPatch) -> RepoResult<Session> {
        SqliteSessionRepository::try_new(self.conn)?.update_session(id, patch)
    }

    pub fn get_session(&self, id: SessionId) -> RepoResult<Option<Session>> {
        SqliteSessionRepository::try_new(self.conn)?.get_session(id)
    }

    pub fn list_sessions(&self) -> RepoResult<Vec<Session>> {
        SqliteSessionRepository::try_new(self.conn)?.list_sessions()
    }

    /// Deletes a session together with its bookings.
    pub fn delete_session(&self, id: SessionId) -> RepoResult<()> {
        cascade::delete_session_with_bookings(self.conn, id)
    }

    // Bookings

    pub fn add_booking(&self, client_id: ClientId, session_id: SessionId) -> RepoResult<BookingId> {
        SqliteBookingRepository::try_new(self.conn)?.add_booking(client_id, session_id)
    }

    pub fn delete_booking(&self, id: BookingId) -> RepoResult<()> {
        SqliteBookingRepository::try_new(self.conn)?.delete_booking(id)
    }

    pub fn client_bookings(&self, client_id: ClientId) -> RepoResult<Vec<Booking>> {
        SqliteBookingRepository::try_new(self.conn)?.bookings_for_client(client_id)
    }

    pub fn session_bookings(&self, session_id: SessionId) -> RepoResult<Vec<Booking>> {
        SqliteBookingRepository::try_new(self.conn)?.bookings_for_session(session_id)
    }

    pub fn session_bookings_count(&self, session_id: SessionId) -> RepoResult<u32> {
        SqliteBookingRepository::try_new(self.conn)?.bookings_count_for_session(session_id)
    }

    // Schedule queries and derived stats

    pub fn sessions_in_range(&self, start: &str, end: &str) -> RepoResult<Vec<SessionView>> {
        schedule::sessions_in_range(self.conn, start, end)
    }

    pub fn total_clients(&self) -> RepoResult<u32> {
        schedule::total_clients(self.conn)
    }

    pub fn sessions_count_in_range(&self, start: &str, end: &str) -> RepoResult<u32> {
        schedule::sessions_count_in_range(self.conn, start, end)
    }

    /// Rounded mean occupancy percentage over `[start, end]`.
    pub fn average_attendance_in_range(&self, start: &str, end: &str) -> RepoResult<u32> {
        let sessions = schedule::sessions_in_range(self.conn, start, end)?;
        Ok(schedule::average_attendance(&sessions))
    }

    // Calendar export view

    /// Read-only calendar view for one session; `dtstamp` is the
    /// generation instant, `YYYY-MM-DD HH:MM`.
    pub fn session_calendar_event(
        &self,
        session_id: SessionId,
        dtstamp: &str,
    ) -> RepoResult<CalendarEvent> {
        calendar::session_event(self.conn, session_id, dtstamp)
    }

    /// The session's calendar view rendered as an ICS text artifact.
    pub fn session_ics(&self, session_id: SessionId, dtstamp: &str) -> RepoResult<String> {
        Ok(calendar::to_ics(&self.session_calendar_event(
            session_id, dtstamp,
        )?))
    }
}

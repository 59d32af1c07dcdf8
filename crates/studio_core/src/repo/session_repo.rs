//! Session repository contract and SQLite implementation.
//!
//! # Invariants
//! - At most one session per exact (date, time) pair. The conflict check
//!   compares `time` strings verbatim: "09:5" and "09:05" are different
//!   values by design, the input shape is the boundary.
//! - Updates are read-modify-merge-write: omitted patch fields persist.

use crate::model::session::{NewSession, Session, SessionId, SessionPatch};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SESSION_COLUMNS: &[&str] = &["id", "date", "time", "class_type", "trainer"];

const SESSION_SELECT_SQL: &str = "SELECT id, date, time, class_type, trainer FROM sessions";

/// Repository interface for session CRUD and lookup operations.
pub trait SessionRepository {
    fn add_session(&self, session: &NewSession) -> RepoResult<SessionId>;
    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> RepoResult<Session>;
    fn get_session(&self, id: SessionId) -> RepoResult<Option<Session>>;
    fn list_sessions(&self) -> RepoResult<Vec<Session>>;
    fn sessions_for_date(&self, date: &str) -> RepoResult<Vec<Session>>;
    fn sessions_by_class_type(&self, class_type: i64) -> RepoResult<Vec<Session>>;
    fn delete_session(&self, id: SessionId) -> RepoResult<()>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "sessions", SESSION_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Rejects with `TimeConflict` when another session shares the exact
    /// (date, time) pair. `exclude` skips the record being updated.
    fn check_slot_free(
        &self,
        date: &str,
        time: &str,
        exclude: Option<SessionId>,
    ) -> RepoResult<()> {
        let same_day = self.sessions_for_date(date)?;
        let conflict = same_day
            .iter()
            .filter(|session| Some(session.id) != exclude)
            .any(|session| session.time == time);
        if conflict {
            return Err(RepoError::TimeConflict {
                date: date.to_string(),
                time: time.to_string(),
            });
        }
        Ok(())
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn add_session(&self, session: &NewSession) -> RepoResult<SessionId> {
        session.validate()?;
        self.check_slot_free(&session.date, &session.time, None)?;

        self.conn.execute(
            "INSERT INTO sessions (date, time, class_type, trainer) VALUES (?1, ?2, ?3, ?4);",
            params![session.date, session.time, session.class_type, session.trainer],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> RepoResult<Session> {
        let mut session = self.get_session(id)?.ok_or(RepoError::NotFound {
            entity: "session",
            id,
        })?;

        session.apply_patch(patch);
        session.validate()?;
        self.check_slot_free(&session.date, &session.time, Some(id))?;

        let changed = self.conn.execute(
            "UPDATE sessions SET date = ?1, time = ?2, class_type = ?3, trainer = ?4 WHERE id = ?5;",
            params![session.date, session.time, session.class_type, session.trainer, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "session",
                id,
            });
        }

        Ok(session)
    }

    fn get_session(&self, id: SessionId) -> RepoResult<Option<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_row(row)?));
        }
        Ok(None)
    }

    fn list_sessions(&self) -> RepoResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} ORDER BY id ASC;"))?;
        let sessions = collect_sessions(stmt.query([])?);
        sessions
    }

    fn sessions_for_date(&self, date: &str) -> RepoResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE date = ?1;"))?;
        let sessions = collect_sessions(stmt.query([date])?);
        sessions
    }

    fn sessions_by_class_type(&self, class_type: i64) -> RepoResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE class_type = ?1;"))?;
        let sessions = collect_sessions(stmt.query([class_type])?);
        sessions
    }

    fn delete_session(&self, id: SessionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "session",
                id,
            });
        }
        Ok(())
    }
}

fn collect_sessions(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Session>> {
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(parse_session_row(row)?);
    }
    Ok(sessions)
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<Session> {
    Ok(Session {
        id: row.get("id")?,
        date: row.get("date")?,
        time: row.get("time")?,
        class_type: row.get("class_type")?,
        trainer: row.get("trainer")?,
    })
}

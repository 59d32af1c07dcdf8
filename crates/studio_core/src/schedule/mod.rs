//! Schedule query engine: date-range lookup, enrichment and aggregates.
//!
//! # Responsibility
//! - Enrich sessions with class-type data and live booking counts for
//!   display.
//! - Derive schedule-level statistics; aggregates are computed, never
//!   stored.
//!
//! # Invariants
//! - A missing or dangling class type degrades that one record to the
//!   "Unknown type" defaults; it never fails the whole query.
//! - `sort_by_time` does not mutate its input.

use crate::model::class_type::{
    ClassTypeId, DEFAULT_CAPACITY, DEFAULT_DURATION_MINUTES, UNKNOWN_CLASS_TYPE_NAME,
};
use crate::model::session::SessionId;
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::class_type_repo::{ClassTypeRepository, SqliteClassTypeRepository};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::RepoResult;
use log::warn;
use rusqlite::Connection;
use serde::Serialize;

/// Sentinel returned by [`end_time`] for unusable input.
pub const END_TIME_SENTINEL: &str = "--:--";

/// Session record enriched with derived class-type data and the live
/// booking count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub date: String,
    pub time: String,
    pub class_type: Option<ClassTypeId>,
    pub trainer: String,
    pub class_type_name: String,
    pub max_participants: u16,
    pub duration: u16,
    pub bookings_count: u32,
}

impl SessionView {
    pub fn is_full(&self) -> bool {
        self.bookings_count >= u32::from(self.max_participants)
    }
}

/// Loads all sessions whose date falls within `[start, end]` inclusive and
/// enriches each with class-type data and its booking count.
///
/// Date comparison is day-granular on the `YYYY-MM-DD` shape; any time
/// suffix a caller may carry is stripped. The returned list is unordered;
/// per-day ordering is the caller's job via [`sort_by_time`].
pub fn sessions_in_range(
    conn: &Connection,
    start: &str,
    end: &str,
) -> RepoResult<Vec<SessionView>> {
    let session_repo = SqliteSessionRepository::try_new(conn)?;
    let class_type_repo = SqliteClassTypeRepository::try_new(conn)?;
    let booking_repo = SqliteBookingRepository::try_new(conn)?;

    let start_day = day_of(start);
    let end_day = day_of(end);

    let mut views = Vec::new();
    for session in session_repo.list_sessions()? {
        let day = day_of(&session.date);
        if day < start_day || day > end_day {
            continue;
        }

        let class_type = match session.class_type {
            Some(id) => match class_type_repo.get_class_type(id) {
                Ok(found) => found,
                Err(err) => {
                    warn!(
                        "event=schedule_enrich module=schedule status=error session_id={} class_type={} error={}",
                        session.id, id, err
                    );
                    None
                }
            },
            None => None,
        };

        let bookings_count = match booking_repo.bookings_count_for_session(session.id) {
            Ok(count) => count,
            Err(err) => {
                warn!(
                    "event=schedule_enrich module=schedule status=error session_id={} error={}",
                    session.id, err
                );
                0
            }
        };

        views.push(SessionView {
            id: session.id,
            date: session.date,
            time: session.time,
            class_type: session.class_type,
            trainer: session.trainer,
            class_type_name: class_type
                .as_ref()
                .map_or_else(|| UNKNOWN_CLASS_TYPE_NAME.to_string(), |ct| ct.name.clone()),
            max_participants: class_type
                .as_ref()
                .map_or(DEFAULT_CAPACITY, |ct| ct.max_participants),
            duration: class_type
                .as_ref()
                .map_or(DEFAULT_DURATION_MINUTES, |ct| ct.duration),
            bookings_count,
        });
    }

    Ok(views)
}

/// Returns a copy of `sessions` stably sorted by minutes-since-midnight.
/// Unparsable times sort first.
pub fn sort_by_time(sessions: &[SessionView]) -> Vec<SessionView> {
    let mut sorted = sessions.to_vec();
    sorted.sort_by_key(|session| minutes_since_midnight(&session.time).unwrap_or(0));
    sorted
}

/// Computes the `HH:MM` end of a slot starting at `start_time` and lasting
/// `duration_minutes`, wrapping past midnight silently.
///
/// Returns [`END_TIME_SENTINEL`] when the start does not parse or the
/// duration is zero; the result never represents a multi-day span.
pub fn end_time(start_time: &str, duration_minutes: u16) -> String {
    if duration_minutes == 0 {
        return END_TIME_SENTINEL.to_string();
    }
    let Some(start) = minutes_since_midnight(start_time) else {
        return END_TIME_SENTINEL.to_string();
    };

    let total = (start + u32::from(duration_minutes)) % (24 * 60);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Total number of client records.
pub fn total_clients(conn: &Connection) -> RepoResult<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM clients;", [], |row| row.get(0))?;
    Ok(count)
}

/// Number of sessions within `[start, end]` inclusive.
pub fn sessions_count_in_range(conn: &Connection, start: &str, end: &str) -> RepoResult<u32> {
    Ok(sessions_in_range(conn, start, end)?.len() as u32)
}

/// Mean occupancy over the given sessions as a rounded percentage.
/// An empty slice yields 0, not an error.
pub fn average_attendance(sessions: &[SessionView]) -> u32 {
    if sessions.is_empty() {
        return 0;
    }

    let total: f64 = sessions
        .iter()
        .map(|session| f64::from(session.bookings_count) / f64::from(session.max_participants))
        .sum();
    ((total / sessions.len() as f64) * 100.0).round() as u32
}

fn minutes_since_midnight(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    Some(hours * 60 + minutes)
}

fn day_of(date: &str) -> &str {
    date.split(['T', ' ']).next().unwrap_or(date)
}

//! Calendar interchange view for a single session.
//!
//! # Responsibility
//! - Assemble the read-only `session + class type + bookings` view an
//!   external calendar exporter consumes.
//! - Escape text fields for the iCalendar wire format; this is the only
//!   external format the core's data crosses into.
//!
//! # Invariants
//! - Every text field in the emitted artifact has backslash, semicolon,
//!   comma and newlines replaced with their escaped forms.

use crate::model::session::SessionId;
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::class_type_repo::{ClassTypeRepository, SqliteClassTypeRepository};
use crate::repo::client_repo::{ClientRepository, SqliteClientRepository};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Location used when the class type description yields none.
pub const DEFAULT_LOCATION: &str = "Yoga Studio";

/// Field values for one exportable calendar event, already shaped for the
/// exporter; timestamps are floating local `YYYYMMDDTHHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub dtstamp: String,
}

/// Builds the calendar view for a session.
///
/// The summary is personalized to `"<type> (<client>)"` when the session
/// holds exactly one booking whose client still exists. The location is
/// taken from the first non-empty line of the class type description, its
/// first sentence as a fallback, then [`DEFAULT_LOCATION`].
///
/// `dtstamp` is the caller-supplied generation instant, `YYYY-MM-DD HH:MM`.
pub fn session_event(
    conn: &Connection,
    session_id: SessionId,
    dtstamp: &str,
) -> RepoResult<CalendarEvent> {
    let session_repo = SqliteSessionRepository::try_new(conn)?;
    let class_type_repo = SqliteClassTypeRepository::try_new(conn)?;
    let booking_repo = SqliteBookingRepository::try_new(conn)?;
    let client_repo = SqliteClientRepository::try_new(conn)?;

    let session = session_repo
        .get_session(session_id)?
        .ok_or(RepoError::NotFound {
            entity: "session",
            id: session_id,
        })?;
    let class_type = match session.class_type {
        Some(id) => class_type_repo
            .get_class_type(id)?
            .ok_or(RepoError::NotFound {
                entity: "class type",
                id,
            })?,
        None => {
            return Err(RepoError::InvalidData(format!(
                "session {session_id} has no class type to export"
            )))
        }
    };

    let bookings = booking_repo.bookings_for_session(session_id)?;
    let single_client = if bookings.len() == 1 {
        client_repo
            .get_client(bookings[0].client_id)?
            .map(|client| client.name)
    } else {
        None
    };

    let summary = match &single_client {
        Some(name) => format!("{} ({name})", class_type.name),
        None => class_type.name.clone(),
    };

    let description_text = class_type.description.as_deref().unwrap_or("");
    let location = extract_location(description_text);

    let mut description = format!(
        "Trainer: {}\nClass type: {}",
        session.trainer, class_type.name
    );
    let remainder = description_remainder(description_text);
    if !remainder.is_empty() {
        description.push_str(&format!("\nDescription: {remainder}"));
    }
    if let Some(name) = &single_client {
        description.push_str(&format!("\nBooked for: {name}"));
    } else if !bookings.is_empty() {
        description.push_str(&format!("\nBookings: {}", bookings.len()));
    }

    let start = format_timestamp(&session.date, &session.time);
    let end = end_timestamp(&session.date, &session.time, class_type.duration);

    Ok(CalendarEvent {
        uid: format!("{session_id}@studio"),
        summary,
        description,
        location,
        start,
        end,
        dtstamp: format_timestamp_from_instant(dtstamp),
    })
}

/// Renders the event as a VCALENDAR text artifact, CRLF line endings,
/// text fields escaped.
pub fn to_ics(event: &CalendarEvent) -> String {
    [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Yoga Studio//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", event.uid),
        format!("DTSTAMP:{}", event.dtstamp),
        format!("DTSTART:{}", event.start),
        format!("DTEND:{}", event.end),
        format!("SUMMARY:{}", escape_text(&event.summary)),
        format!("DESCRIPTION:{}", escape_text(&event.description)),
        format!("LOCATION:{}", escape_text(&event.location)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n")
}

/// Escapes a text value for iCalendar fields.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// First non-empty description line, else its first sentence, else the
/// default studio location.
fn extract_location(description: &str) -> String {
    if let Some(line) = description.lines().next() {
        let line = line.trim();
        if !line.is_empty() {
            return line.to_string();
        }
    }
    if let Some(sentence) = description.split('.').next() {
        let sentence = sentence.trim();
        if !sentence.is_empty() {
            return sentence.to_string();
        }
    }
    DEFAULT_LOCATION.to_string()
}

/// Description without its first line (the location), trimmed.
fn description_remainder(description: &str) -> String {
    description
        .lines()
        .skip(1)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `YYYY-MM-DD` + `HH:MM` -> `YYYYMMDDTHHMM00`.
fn format_timestamp(date: &str, time: &str) -> String {
    format!("{}T{}00", date.replace('-', ""), time.replace(':', ""))
}

/// `YYYY-MM-DD HH:MM` -> `YYYYMMDDTHHMM00`.
fn format_timestamp_from_instant(instant: &str) -> String {
    match instant.split_once(' ') {
        Some((date, time)) => format_timestamp(date, time),
        None => format_timestamp(instant, "00:00"),
    }
}

/// End timestamp for a slot, rolling the date forward when the slot
/// crosses midnight.
fn end_timestamp(date: &str, time: &str, duration_minutes: u16) -> String {
    let Some(start) = parse_minutes(time) else {
        return format_timestamp(date, time);
    };

    let total = start + u32::from(duration_minutes);
    let end_time = format!("{:02}:{:02}", (total / 60) % 24, total % 60);
    let end_date = if total >= 24 * 60 {
        next_day(date).unwrap_or_else(|| date.to_string())
    } else {
        date.to_string()
    };
    format_timestamp(&end_date, &end_time)
}

fn parse_minutes(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    Some(hours.parse::<u32>().ok()? * 60 + minutes.parse::<u32>().ok()?)
}

fn next_day(date: &str) -> Option<String> {
    let mut parts = date.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;

    let (year, month, day) = if day < days_in_month(year, month) {
        (year, month, day + 1)
    } else if month < 12 {
        (year, month + 1, 1)
    } else {
        (year + 1, 1, 1)
    };
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        _ => 28,
    }
}

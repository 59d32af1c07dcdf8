//! Multi-step deletion strategies for class types and clients.
//!
//! # Responsibility
//! - Resolve a deletion request into the explicit per-record steps it
//!   implies, driven by a caller-chosen strategy variant.
//!
//! # Invariants
//! - No automatic policy: dependents are only touched via the strategy the
//!   caller selected.
//! - Cascades are deliberately NOT wrapped in a single transaction: each
//!   step commits on its own, so a mid-cascade failure leaves earlier
//!   steps applied. Steps run strictly sequentially, one dependent record
//!   at a time, which keeps failure attribution per-record. SQLite could
//!   provide multi-table atomicity here; the partial-failure semantics are
//!   kept on purpose (see DESIGN.md).

use crate::model::booking::BookingsCount;
use crate::model::class_type::ClassTypeId;
use crate::model::client::ClientId;
use crate::model::session::{SessionId, SessionPatch};
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::class_type_repo::{ClassTypeRepository, SqliteClassTypeRepository};
use crate::repo::client_repo::{ClientRepository, SqliteClientRepository};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Caller-chosen strategy for deleting a class type with dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTypeDeletion {
    /// Delete every dependent session (and its bookings), then the type.
    DeleteAll,
    /// Delete only the type; sessions keep a dangling reference rendered
    /// as "Unknown type" by all readers.
    KeepSessions,
    /// Rewrite every dependent session to the given type, then delete.
    ReplaceWith(ClassTypeId),
}

/// Caller-chosen strategy for deleting a client with bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDeletion {
    /// Delete every booking belonging to the client, then the client.
    DeleteAll,
    /// Delete only bookings whose session lies in the future; past
    /// bookings survive as orphaned history.
    DeleteUpcomingOnly,
}

/// Deletes a class type according to the chosen strategy.
///
/// A type with no dependent sessions is deleted immediately whatever the
/// strategy says. `ReplaceWith` fails with `InvalidReplacement` when the
/// target is the type being deleted or does not exist.
pub fn delete_class_type(
    conn: &Connection,
    id: ClassTypeId,
    strategy: ClassTypeDeletion,
) -> RepoResult<()> {
    let class_type_repo = SqliteClassTypeRepository::try_new(conn)?;
    let session_repo = SqliteSessionRepository::try_new(conn)?;

    if class_type_repo.get_class_type(id)?.is_none() {
        return Err(RepoError::NotFound {
            entity: "class type",
            id,
        });
    }

    let usage = class_type_repo.usage_count(id)?;
    if usage == 0 {
        class_type_repo.delete_class_type(id)?;
        info!("event=class_type_delete module=cascade status=ok class_type={id} usage=0");
        return Ok(());
    }

    match strategy {
        ClassTypeDeletion::DeleteAll => {
            for session in session_repo.sessions_by_class_type(id)? {
                delete_session_with_bookings(conn, session.id)?;
            }
            class_type_repo.delete_class_type(id)?;
            info!(
                "event=class_type_delete module=cascade status=ok class_type={id} strategy=delete_all usage={usage}"
            );
        }
        ClassTypeDeletion::KeepSessions => {
            class_type_repo.delete_class_type(id)?;
            info!(
                "event=class_type_delete module=cascade status=ok class_type={id} strategy=keep_sessions usage={usage}"
            );
        }
        ClassTypeDeletion::ReplaceWith(replacement) => {
            if replacement == id || class_type_repo.get_class_type(replacement)?.is_none() {
                return Err(RepoError::InvalidReplacement(replacement));
            }
            for session in session_repo.sessions_by_class_type(id)? {
                let patch = SessionPatch {
                    class_type: Some(replacement),
                    ..SessionPatch::default()
                };
                session_repo.update_session(session.id, &patch)?;
            }
            class_type_repo.delete_class_type(id)?;
            info!(
                "event=class_type_delete module=cascade status=ok class_type={id} strategy=replace_with replacement={replacement} usage={usage}"
            );
        }
    }

    Ok(())
}

/// Deletes a client according to the chosen strategy.
///
/// `now` is `YYYY-MM-DD HH:MM`; a booking is upcoming when its session
/// starts strictly after `now`. Bookings whose session no longer exists
/// count as past and are kept by `DeleteUpcomingOnly`.
pub fn delete_client(
    conn: &Connection,
    id: ClientId,
    now: &str,
    strategy: ClientDeletion,
) -> RepoResult<()> {
    let booking_repo = SqliteBookingRepository::try_new(conn)?;
    let session_repo = SqliteSessionRepository::try_new(conn)?;
    let client_repo = SqliteClientRepository::try_new(conn)?;

    if client_repo.get_client(id)?.is_none() {
        return Err(RepoError::NotFound {
            entity: "client",
            id,
        });
    }

    let bookings = booking_repo.bookings_for_client(id)?;
    let mut deleted = 0u32;
    for booking in &bookings {
        let delete = match strategy {
            ClientDeletion::DeleteAll => true,
            ClientDeletion::DeleteUpcomingOnly => session_repo
                .get_session(booking.session_id)?
                .is_some_and(|session| session.starts_after(now)),
        };
        if delete {
            booking_repo.delete_booking(booking.id)?;
            deleted += 1;
        }
    }

    client_repo.delete_client(id)?;
    info!(
        "event=client_delete module=cascade status=ok client={id} bookings_total={} bookings_deleted={deleted}",
        bookings.len()
    );
    Ok(())
}

/// Deletes a session's bookings, then the session itself.
pub fn delete_session_with_bookings(conn: &Connection, session_id: SessionId) -> RepoResult<()> {
    let booking_repo = SqliteBookingRepository::try_new(conn)?;
    let session_repo = SqliteSessionRepository::try_new(conn)?;

    for booking in booking_repo.bookings_for_session(session_id)? {
        booking_repo.delete_booking(booking.id)?;
    }
    session_repo.delete_session(session_id)?;
    info!("event=session_delete module=cascade status=ok session={session_id}");
    Ok(())
}

/// Total and upcoming booking counts for a client, as shown by the
/// deletion dialog.
pub fn client_bookings_count(
    conn: &Connection,
    client_id: ClientId,
    now: &str,
) -> RepoResult<BookingsCount> {
    let booking_repo = SqliteBookingRepository::try_new(conn)?;
    let session_repo = SqliteSessionRepository::try_new(conn)?;

    let bookings = booking_repo.bookings_for_client(client_id)?;
    let mut upcoming = 0u32;
    for booking in &bookings {
        if session_repo
            .get_session(booking.session_id)?
            .is_some_and(|session| session.starts_after(now))
        {
            upcoming += 1;
        }
    }

    Ok(BookingsCount {
        total: bookings.len() as u32,
        upcoming,
    })
}

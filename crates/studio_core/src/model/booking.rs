//! Booking domain model.
//!
//! # Invariants
//! - At most one booking exists per (client, session) pair.
//! - A booking may outlive its client; orphaned past bookings are retained
//!   history after a `DeleteUpcomingOnly` client deletion.

use crate::model::client::ClientId;
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};

/// Stable store-assigned identifier for a booking record.
pub type BookingId = i64;

/// Persisted booking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub client_id: ClientId,
    pub session_id: SessionId,
    /// Creation timestamp, epoch milliseconds.
    pub booking_date: i64,
}

/// Per-client booking tally used by the client deletion dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsCount {
    pub total: u32,
    /// Bookings whose session starts strictly after the supplied `now`.
    pub upcoming: u32,
}

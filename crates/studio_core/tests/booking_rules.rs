use rusqlite::Connection;
use studio_core::db::open_db_in_memory;
use studio_core::{
    BookingRepository, ClassTypeRepository, ClientRepository, NewClassType, NewClient, NewSession,
    RepoError, SessionRepository, SqliteBookingRepository, SqliteClassTypeRepository,
    SqliteClientRepository, SqliteSessionRepository,
};

fn add_client(conn: &Connection, name: &str) -> i64 {
    SqliteClientRepository::try_new(conn)
        .unwrap()
        .add_client(&NewClient {
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
        })
        .unwrap()
}

fn add_class_type(conn: &Connection, name: &str, max_participants: u16) -> i64 {
    SqliteClassTypeRepository::try_new(conn)
        .unwrap()
        .add_class_type(&NewClassType {
            name: name.to_string(),
            duration: 60,
            max_participants,
            description: None,
        })
        .unwrap()
}

fn add_session(conn: &Connection, time: &str, class_type: Option<i64>) -> i64 {
    SqliteSessionRepository::try_new(conn)
        .unwrap()
        .add_session(&NewSession {
            date: "2026-09-01".to_string(),
            time: time.to_string(),
            class_type,
            trainer: "Anna".to_string(),
        })
        .unwrap()
}

#[test]
fn booking_roundtrip_sets_creation_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::try_new(&conn).unwrap();

    let client = add_client(&conn, "Anna");
    let class_type = add_class_type(&conn, "Hatha", 10);
    let session = add_session(&conn, "10:00", Some(class_type));

    let id = repo.add_booking(client, session).unwrap();
    let booking = repo.get_booking(id).unwrap().unwrap();
    assert_eq!(booking.client_id, client);
    assert_eq!(booking.session_id, session);
    assert!(booking.booking_date > 0);
}

#[test]
fn second_booking_for_same_pair_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::try_new(&conn).unwrap();

    let client = add_client(&conn, "Anna");
    let class_type = add_class_type(&conn, "Hatha", 10);
    let session = add_session(&conn, "10:00", Some(class_type));

    repo.add_booking(client, session).unwrap();
    let err = repo.add_booking(client, session).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateBooking { .. }));
    assert_eq!(repo.bookings_count_for_session(session).unwrap(), 1);
}

#[test]
fn capacity_boundary_last_seat_fills_the_session() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::try_new(&conn).unwrap();

    let class_type = add_class_type(&conn, "Small group", 2);
    let session = add_session(&conn, "10:00", Some(class_type));

    let first = add_client(&conn, "Anna");
    let second = add_client(&conn, "Boris");
    let third = add_client(&conn, "Vera");

    repo.add_booking(first, session).unwrap();
    // max_participants - 1 booked: the last seat is still grantable.
    repo.add_booking(second, session).unwrap();
    assert_eq!(repo.bookings_count_for_session(session).unwrap(), 2);

    let err = repo.add_booking(third, session).unwrap_err();
    assert!(matches!(
        err,
        RepoError::SessionFull {
            capacity: 2,
            ..
        }
    ));
    assert_eq!(repo.bookings_count_for_session(session).unwrap(), 2);
}

#[test]
fn dangling_class_type_falls_back_to_default_capacity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::try_new(&conn).unwrap();

    // References a class type id that was never created.
    let session = add_session(&conn, "10:00", Some(999));

    for i in 0..10 {
        let client = add_client(&conn, &format!("Client {i}"));
        repo.add_booking(client, session).unwrap();
    }

    let one_more = add_client(&conn, "Latecomer");
    let err = repo.add_booking(one_more, session).unwrap_err();
    assert!(matches!(err, RepoError::SessionFull { capacity: 10, .. }));
}

#[test]
fn booking_into_missing_session_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::try_new(&conn).unwrap();

    let client = add_client(&conn, "Anna");
    let err = repo.add_booking(client, 404).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "session",
            id: 404
        }
    ));
}

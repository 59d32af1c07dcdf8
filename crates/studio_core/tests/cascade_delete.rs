use rusqlite::Connection;
use studio_core::db::open_db_in_memory;
use studio_core::{
    ClassTypeDeletion, ClientDeletion, NewClassType, NewClient, NewSession, RepoError, Studio,
};

fn add_client(studio: &Studio, name: &str) -> i64 {
    studio
        .add_client(&NewClient {
            name: name.to_string(),
            ..NewClient::default()
        })
        .unwrap()
}

fn add_class_type(studio: &Studio, name: &str) -> i64 {
    studio
        .add_class_type(&NewClassType {
            name: name.to_string(),
            duration: 60,
            max_participants: 10,
            description: None,
        })
        .unwrap()
}

fn add_session(studio: &Studio, date: &str, time: &str, class_type: Option<i64>) -> i64 {
    studio
        .add_session(&NewSession {
            date: date.to_string(),
            time: time.to_string(),
            class_type,
            trainer: "Anna".to_string(),
        })
        .unwrap()
}

fn bookings_total(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM bookings;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn class_type_delete_all_removes_dependent_sessions_and_their_bookings() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let other = add_class_type(&studio, "Vinyasa");
    let first = add_session(&studio, "2026-09-01", "10:00", Some(hatha));
    let second = add_session(&studio, "2026-09-02", "10:00", Some(hatha));
    let unrelated = add_session(&studio, "2026-09-03", "10:00", Some(other));

    let client = add_client(&studio, "Anna");
    studio.add_booking(client, first).unwrap();
    studio.add_booking(client, second).unwrap();
    studio.add_booking(client, unrelated).unwrap();

    studio
        .delete_class_type(hatha, ClassTypeDeletion::DeleteAll)
        .unwrap();

    assert!(studio.get_class_type(hatha).unwrap().is_none());
    assert!(studio.get_session(first).unwrap().is_none());
    assert!(studio.get_session(second).unwrap().is_none());
    assert!(studio.get_session(unrelated).unwrap().is_some());
    // Only the booking on the untouched session survives.
    assert_eq!(bookings_total(&conn), 1);
}

#[test]
fn class_type_keep_sessions_leaves_dangling_references() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let session = add_session(&studio, "2026-09-01", "10:00", Some(hatha));

    studio
        .delete_class_type(hatha, ClassTypeDeletion::KeepSessions)
        .unwrap();

    assert!(studio.get_class_type(hatha).unwrap().is_none());
    let kept = studio.get_session(session).unwrap().unwrap();
    assert_eq!(kept.class_type, Some(hatha));

    // Readers render the dangling reference with defaults.
    let views = studio.sessions_in_range("2026-09-01", "2026-09-01").unwrap();
    assert_eq!(views[0].class_type_name, "Unknown type");
}

#[test]
fn class_type_replace_with_rewrites_every_dependent_session() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let vinyasa = add_class_type(&studio, "Vinyasa");
    let first = add_session(&studio, "2026-09-01", "10:00", Some(hatha));
    let second = add_session(&studio, "2026-09-02", "10:00", Some(hatha));

    studio
        .delete_class_type(hatha, ClassTypeDeletion::ReplaceWith(vinyasa))
        .unwrap();

    assert!(studio.get_class_type(hatha).unwrap().is_none());
    assert_eq!(
        studio.get_session(first).unwrap().unwrap().class_type,
        Some(vinyasa)
    );
    assert_eq!(
        studio.get_session(second).unwrap().unwrap().class_type,
        Some(vinyasa)
    );
}

#[test]
fn replace_with_rejects_missing_target_and_self_replacement() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    add_session(&studio, "2026-09-01", "10:00", Some(hatha));

    let missing = studio
        .delete_class_type(hatha, ClassTypeDeletion::ReplaceWith(999))
        .unwrap_err();
    assert!(matches!(missing, RepoError::InvalidReplacement(999)));

    let self_ref = studio
        .delete_class_type(hatha, ClassTypeDeletion::ReplaceWith(hatha))
        .unwrap_err();
    assert!(matches!(self_ref, RepoError::InvalidReplacement(id) if id == hatha));

    // A failed replacement leaves everything in place.
    assert!(studio.get_class_type(hatha).unwrap().is_some());
    assert_eq!(studio.class_type_usage_count(hatha).unwrap(), 1);
}

#[test]
fn unused_class_type_is_deleted_immediately_regardless_of_strategy() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let unused = add_class_type(&studio, "Unused");
    // ReplaceWith(999) would fail validation, but with zero dependents the
    // strategy is never consulted.
    studio
        .delete_class_type(unused, ClassTypeDeletion::ReplaceWith(999))
        .unwrap();
    assert!(studio.get_class_type(unused).unwrap().is_none());
}

#[test]
fn deleting_missing_class_type_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    assert!(matches!(
        studio.delete_class_type(5, ClassTypeDeletion::DeleteAll),
        Err(RepoError::NotFound {
            entity: "class type",
            id: 5
        })
    ));
}

#[test]
fn client_delete_all_removes_every_booking_with_the_client() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let past = add_session(&studio, "2026-01-10", "10:00", Some(hatha));
    let future = add_session(&studio, "2026-12-10", "10:00", Some(hatha));

    let anna = add_client(&studio, "Anna");
    let boris = add_client(&studio, "Boris");
    studio.add_booking(anna, past).unwrap();
    studio.add_booking(anna, future).unwrap();
    studio.add_booking(boris, future).unwrap();

    studio
        .delete_client(anna, "2026-08-25 12:00", ClientDeletion::DeleteAll)
        .unwrap();

    assert!(studio.get_client(anna).unwrap().is_none());
    assert_eq!(studio.client_bookings(anna).unwrap().len(), 0);
    // Boris and both sessions are untouched.
    assert_eq!(studio.client_bookings(boris).unwrap().len(), 1);
    assert!(studio.get_session(past).unwrap().is_some());
    assert!(studio.get_session(future).unwrap().is_some());
}

#[test]
fn client_delete_upcoming_only_keeps_past_bookings_as_history() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let past = add_session(&studio, "2026-01-10", "10:00", Some(hatha));
    let future = add_session(&studio, "2026-12-10", "10:00", Some(hatha));

    let anna = add_client(&studio, "Anna");
    studio.add_booking(anna, past).unwrap();
    studio.add_booking(anna, future).unwrap();

    studio
        .delete_client(anna, "2026-08-25 12:00", ClientDeletion::DeleteUpcomingOnly)
        .unwrap();

    assert!(studio.get_client(anna).unwrap().is_none());
    let remaining = studio.client_bookings(anna).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_id, past);
}

#[test]
fn orphaned_booking_counts_as_past_and_survives_upcoming_only() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let future = add_session(&studio, "2026-12-10", "10:00", Some(hatha));
    let anna = add_client(&studio, "Anna");
    studio.add_booking(anna, future).unwrap();

    // Orphan the booking by removing its session row directly.
    conn.execute("DELETE FROM sessions WHERE id = ?1;", [future])
        .unwrap();

    studio
        .delete_client(anna, "2026-08-25 12:00", ClientDeletion::DeleteUpcomingOnly)
        .unwrap();
    assert_eq!(studio.client_bookings(anna).unwrap().len(), 1);
}

#[test]
fn client_bookings_count_splits_total_and_upcoming() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let past = add_session(&studio, "2026-01-10", "10:00", Some(hatha));
    let future = add_session(&studio, "2026-12-10", "10:00", Some(hatha));
    let later_today = add_session(&studio, "2026-08-25", "18:00", Some(hatha));

    let anna = add_client(&studio, "Anna");
    studio.add_booking(anna, past).unwrap();
    studio.add_booking(anna, future).unwrap();
    studio.add_booking(anna, later_today).unwrap();

    let counts = studio
        .client_bookings_count(anna, "2026-08-25 12:00")
        .unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.upcoming, 2);
}

#[test]
fn deleting_session_removes_its_bookings_first() {
    let conn = open_db_in_memory().unwrap();
    let studio = Studio::new(&conn);

    let hatha = add_class_type(&studio, "Hatha");
    let session = add_session(&studio, "2026-09-01", "10:00", Some(hatha));
    let anna = add_client(&studio, "Anna");
    let boris = add_client(&studio, "Boris");
    studio.add_booking(anna, session).unwrap();
    studio.add_booking(boris, session).unwrap();

    studio.delete_session(session).unwrap();

    assert!(studio.get_session(session).unwrap().is_none());
    assert_eq!(bookings_total(&conn), 0);
}

use studio_core::db::open_db_in_memory;
use studio_core::model::ValidationError;
use studio_core::{
    NewSession, RepoError, SessionPatch, SessionRepository, SqliteSessionRepository,
};

fn new_session(date: &str, time: &str) -> NewSession {
    NewSession {
        date: date.to_string(),
        time: time.to_string(),
        class_type: None,
        trainer: "Anna".to_string(),
    }
}

#[test]
fn second_session_at_same_date_and_time_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    repo.add_session(&new_session("2026-09-01", "10:00")).unwrap();
    let err = repo
        .add_session(&new_session("2026-09-01", "10:00"))
        .unwrap_err();

    assert!(matches!(err, RepoError::TimeConflict { .. }));
    assert_eq!(repo.list_sessions().unwrap().len(), 1);
}

#[test]
fn same_time_on_another_date_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    repo.add_session(&new_session("2026-09-01", "10:00")).unwrap();
    repo.add_session(&new_session("2026-09-02", "10:00")).unwrap();

    assert_eq!(repo.list_sessions().unwrap().len(), 2);
}

#[test]
fn conflict_check_compares_time_strings_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    // "09:05" and "09:5" are numerically equal but different values;
    // the input shape is the boundary, not the clock.
    repo.add_session(&new_session("2026-09-01", "09:05")).unwrap();
    repo.add_session(&new_session("2026-09-01", "09:5")).unwrap();

    assert_eq!(repo.sessions_for_date("2026-09-01").unwrap().len(), 2);
}

#[test]
fn update_merges_partial_fields_and_rechecks_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let first = repo.add_session(&new_session("2026-09-01", "10:00")).unwrap();
    repo.add_session(&new_session("2026-09-01", "11:00")).unwrap();

    // Re-saving without a time change must not conflict with itself.
    let updated = repo
        .update_session(
            first,
            &SessionPatch {
                trainer: Some("Boris".to_string()),
                ..SessionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.trainer, "Boris");
    assert_eq!(updated.date, "2026-09-01");
    assert_eq!(updated.time, "10:00");

    let err = repo
        .update_session(
            first,
            &SessionPatch {
                time: Some("11:00".to_string()),
                ..SessionPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::TimeConflict { .. }));

    // Failed update leaves the stored record untouched.
    let stored = repo.get_session(first).unwrap().unwrap();
    assert_eq!(stored.time, "10:00");
}

#[test]
fn missing_required_fields_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let err = repo
        .add_session(&NewSession {
            date: "2026-09-01".to_string(),
            time: "10:00".to_string(),
            class_type: None,
            trainer: " ".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField("trainer"))
    ));
}

#[test]
fn delete_missing_session_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.delete_session(7),
        Err(RepoError::NotFound {
            entity: "session",
            id: 7
        })
    ));
}

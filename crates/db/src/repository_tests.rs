//! Repository tests against `InMemoryGateway`.
//!
//! No Postgres connection is required. Tests that need a live database live in
//! `tests/postgres.rs` and are ignored by default.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::mock::{Failures, InMemoryGateway, TxOutcome};
use crate::repository::users;
use crate::{DbError, ReservationRepository};

/// A repository over a fresh gateway with one seeded user.
fn setup() -> (ReservationRepository<InMemoryGateway>, Uuid) {
    let gateway = InMemoryGateway::new();
    let user = gateway.seed_user("Taro", "taro@example.com", "secret");
    (ReservationRepository::new(gateway), user.id)
}

// ============================================================
// create_reservation
// ============================================================

#[tokio::test]
async fn created_reservation_can_be_fetched_back() {
    let (repo, user_id) = setup();

    let id = repo
        .create_reservation(&user_id.to_string(), "2026-12-24T19:00:00Z", 2, "anniversary", "pending")
        .await
        .expect("create should succeed");
    assert!(!id.is_nil());

    let row = repo.fetch_reservation_by_id(id).await.expect("row exists");
    assert_eq!(row.id, id);
    assert_eq!(row.user_id, user_id);
    assert_eq!(row.reservation_date, Utc.with_ymd_and_hms(2026, 12, 24, 19, 0, 0).unwrap());
    assert_eq!(row.num_people, 2);
    assert_eq!(row.special_request.as_deref(), Some("anniversary"));
    assert_eq!(row.status, "pending");
    assert_eq!(row.created_at, row.updated_at);

    assert_eq!(repo.gateway().transaction_outcomes(), vec![TxOutcome::Committed]);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_store() {
    let (repo, user_id) = setup();
    let user = user_id.to_string();
    let user = user.as_str();

    let cases = [
        ("", "2026-12-24", 2, "none", "pending"),
        (user, "", 2, "none", "pending"),
        (user, "2026-12-24", 0, "none", "pending"),
        (user, "2026-12-24", -3, "none", "pending"),
        (user, "2026-12-24", 2, "", "pending"),
        (user, "2026-12-24", 2, "none", ""),
    ];

    for (user_id, date, people, request, status) in cases {
        let err = repo
            .create_reservation(user_id, date, people, request, status)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err:?}");
    }

    assert_eq!(repo.gateway().begin_count(), 0);
    assert_eq!(repo.gateway().reservation_count(), 0);
}

#[tokio::test]
async fn whitespace_only_request_and_status_are_accepted() {
    let (repo, user_id) = setup();
    let user = user_id.to_string();

    let blank_request = repo
        .create_reservation(&user, "2026-12-24", 2, " ", "pending")
        .await
        .expect("a single space is not empty");
    let blank_status = repo
        .create_reservation(&user, "2026-12-24", 2, "none", "  ")
        .await
        .expect("a padded status is not empty");

    let row = repo.fetch_reservation_by_id(blank_request).await.unwrap();
    assert_eq!(row.special_request.as_deref(), Some(" "));
    let row = repo.fetch_reservation_by_id(blank_status).await.unwrap();
    assert_eq!(row.status, "  ");
    assert_eq!(repo.gateway().reservation_count(), 2);
}

#[tokio::test]
async fn failed_insert_rolls_back_and_leaves_no_row() {
    let (repo, _) = setup();
    let unknown_user = Uuid::new_v4().to_string();

    let err = repo
        .create_reservation(&unknown_user, "2026-12-24", 4, "none", "pending")
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Sqlx(_)));
    assert_eq!(repo.gateway().transaction_outcomes(), vec![TxOutcome::RolledBack]);
    assert_eq!(repo.gateway().reservation_count(), 0);
    assert!(repo.fetch_reservations().await.unwrap().is_empty());
}

#[tokio::test]
async fn rollback_failure_still_returns_the_insert_error() {
    let (repo, user_id) = setup();
    repo.gateway().set_failures(Failures {
        insert: true,
        rollback: true,
        ..Failures::default()
    });

    let err = repo
        .create_reservation(&user_id.to_string(), "2026-12-24", 4, "none", "pending")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("insert into reservations failed"));
    assert_eq!(repo.gateway().transaction_outcomes(), vec![TxOutcome::RollbackFailed]);
    assert_eq!(repo.gateway().reservation_count(), 0);
}

#[tokio::test]
async fn commit_failure_is_reported() {
    let (repo, user_id) = setup();
    repo.gateway().set_failures(Failures {
        commit: true,
        ..Failures::default()
    });

    let result = repo
        .create_reservation(&user_id.to_string(), "2026-12-24", 4, "none", "pending")
        .await;

    assert!(result.is_err());
    assert_eq!(repo.gateway().transaction_outcomes(), vec![TxOutcome::CommitFailed]);
    assert_eq!(repo.gateway().reservation_count(), 0);
}

#[tokio::test]
async fn begin_failure_is_reported_without_a_transaction() {
    let (repo, user_id) = setup();
    repo.gateway().set_failures(Failures {
        begin: true,
        ..Failures::default()
    });

    let err = repo
        .create_reservation(&user_id.to_string(), "2026-12-24", 4, "none", "pending")
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Sqlx(_)));
    assert_eq!(repo.gateway().begin_count(), 1);
    assert!(repo.gateway().transaction_outcomes().is_empty());
}

// ============================================================
// reservation reads
// ============================================================

#[tokio::test]
async fn reservations_are_listed_newest_first() {
    let (repo, user_id) = setup();
    let user = user_id.to_string();

    let first = repo
        .create_reservation(&user, "2026-12-01", 2, "first", "pending")
        .await
        .unwrap();
    let second = repo
        .create_reservation(&user, "2026-12-02", 3, "second", "confirmed")
        .await
        .unwrap();

    let rows = repo.fetch_reservations().await.unwrap();
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert!(rows[0].created_at > rows[1].created_at);
}

#[tokio::test]
async fn failed_listing_returns_only_an_error() {
    let (repo, user_id) = setup();
    repo.create_reservation(&user_id.to_string(), "2026-12-01", 2, "x", "pending")
        .await
        .unwrap();

    repo.gateway().set_failures(Failures {
        queries: true,
        ..Failures::default()
    });

    let result = repo.fetch_reservations().await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

#[tokio::test]
async fn reservation_lookups_distinguish_missing_rows_from_store_errors() {
    let (repo, user_id) = setup();

    let err = repo.fetch_reservation_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());

    let err = repo.fetch_reservation_by_user_id(user_id).await.unwrap_err();
    assert!(err.is_not_found());

    repo.gateway().set_failures(Failures {
        queries: true,
        ..Failures::default()
    });
    let err = repo.fetch_reservation_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, DbError::Sqlx(_)));

    let err = repo.fetch_reservation_by_user_id(user_id).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, DbError::Sqlx(_)));
}

#[tokio::test]
async fn reservation_is_found_by_user_id() {
    let (repo, user_id) = setup();
    let other = repo.gateway().seed_user("Jiro", "jiro@example.com", "pw").id;

    let id = repo
        .create_reservation(&user_id.to_string(), "2026-12-24", 2, "none", "pending")
        .await
        .unwrap();
    repo.create_reservation(&other.to_string(), "2026-12-25", 5, "none", "pending")
        .await
        .unwrap();

    let row = repo.fetch_reservation_by_user_id(user_id).await.unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.user_id, user_id);
}

// ============================================================
// users
// ============================================================

#[tokio::test]
async fn created_user_is_listed_and_found() {
    let gateway = InMemoryGateway::new();

    users::create_user(&gateway, "Hanako", "hanako@example.com", "pw1")
        .await
        .unwrap();
    users::create_user(&gateway, "Ichiro", "ichiro@example.com", "pw2")
        .await
        .unwrap();

    let all = users::fetch_users(&gateway).await.unwrap();
    let emails: Vec<&str> = all.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["ichiro@example.com", "hanako@example.com"]);

    let by_email = users::fetch_user_by_email(&gateway, "hanako@example.com")
        .await
        .unwrap();
    assert_eq!(by_email.name, "Hanako");

    let by_id = users::fetch_user_by_id(&gateway, by_email.id).await.unwrap();
    assert_eq!(by_id, by_email);

    assert_eq!(gateway.stored_password("hanako@example.com").as_deref(), Some("pw1"));
}

#[tokio::test]
async fn credentials_must_match_exactly() {
    let gateway = InMemoryGateway::new();
    let seeded = gateway.seed_user("Taro", "taro@example.com", "correct horse");

    let user = users::fetch_user_by_email_and_password(&gateway, "taro@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.id, seeded.id);

    for (email, password) in [
        ("taro@example.com", "wrong"),
        ("taro@example.com", "Correct horse"),
        ("taro@example.com", ""),
        ("TARO@example.com", "correct horse"),
        ("nobody@example.com", "correct horse"),
    ] {
        let err = users::fetch_user_by_email_and_password(&gateway, email, password)
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{email}/{password} should not match");
    }
}

#[tokio::test]
async fn user_lookups_report_missing_rows() {
    let gateway = InMemoryGateway::new();

    assert!(users::fetch_user_by_id(&gateway, Uuid::new_v4())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(users::fetch_user_by_email(&gateway, "ghost@example.com")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn create_user_does_not_validate_but_store_rejects_duplicates() {
    let gateway = InMemoryGateway::new();

    users::create_user(&gateway, "", "", "").await.unwrap();
    assert_eq!(gateway.user_count(), 1);

    users::create_user(&gateway, "Dup", "dup@example.com", "a").await.unwrap();
    let err = users::create_user(&gateway, "Dup again", "dup@example.com", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));
    assert_eq!(gateway.user_count(), 2);
}

#[tokio::test]
async fn failed_user_queries_return_errors() {
    let gateway = InMemoryGateway::new();
    gateway.seed_user("Taro", "taro@example.com", "secret");
    gateway.set_failures(Failures {
        queries: true,
        ..Failures::default()
    });

    assert!(users::fetch_users(&gateway).await.is_err());
    assert!(users::create_user(&gateway, "New", "new@example.com", "pw").await.is_err());

    let err = users::fetch_user_by_email(&gateway, "taro@example.com")
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
}

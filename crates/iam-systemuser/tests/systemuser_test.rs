mod support;

use std::sync::Arc;

use iam_identity::MemoryIdentityProvider;
use iam_systemuser::{is_authenticatable, SystemUserService};
use uuid::Uuid;

fn service(db: sea_orm::DatabaseConnection) -> SystemUserService {
    SystemUserService::new(db, Arc::new(MemoryIdentityProvider::new()))
}

#[tokio::test]
async fn create_returns_a_password_once_and_stores_a_system_user_row() {
    let db = support::setup_test_db().await;
    let service = service(db);
    let creator = Uuid::new_v4();

    let (row, password) = service
        .create("billing-worker", None, "worker", Some("nightly billing run".into()), creator)
        .await
        .unwrap();

    assert_eq!(row.synthetic_email, "billing-worker@system.internal");
    assert_eq!(row.application_name, "billing-worker");
    assert!(row.is_primary);
    assert!(row.is_active);
    assert!(row.expires_at.is_none());
    assert!(!password.is_empty());
}

#[tokio::test]
async fn regenerate_password_returns_a_new_credential() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (row, first_password) = service
        .create("reporting-bot", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    let second_password = service.regenerate_password(row.id).await.unwrap();
    assert_ne!(first_password, second_password);
}

#[tokio::test]
async fn rotate_with_grace_period_creates_a_new_primary_and_demotes_the_old_one() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (old, _password) = service
        .create("sync-agent", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    let (new_row, _new_password) = service.rotate_with_grace_period(old.id, 7).await.unwrap();

    assert!(new_row.is_primary);
    assert!(new_row.is_active);
    assert_eq!(new_row.application_name, "sync-agent");
    assert_ne!(new_row.synthetic_email, old.synthetic_email);

    let old_reloaded = service.get(old.id).await.unwrap();
    assert!(!old_reloaded.is_primary);
    assert!(old_reloaded.is_active);
    assert!(old_reloaded.expires_at.is_some());

    assert_eq!(service.count_active_primary("sync-agent").await.unwrap(), 1);
}

#[tokio::test]
async fn revoke_non_primary_deactivates_every_secondary_credential() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (old, _) = service
        .create("export-service", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();
    service.rotate_with_grace_period(old.id, 7).await.unwrap();

    let revoked = service.revoke_non_primary("export-service").await.unwrap();
    assert_eq!(revoked, 1);

    let old_reloaded = service.get(old.id).await.unwrap();
    assert!(!old_reloaded.is_active);
}

#[tokio::test]
async fn deactivate_flips_is_active() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (row, _password) = service
        .create("audit-collector", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    let deactivated = service.deactivate(row.id).await.unwrap();
    assert!(!deactivated.is_active);
}

#[tokio::test]
async fn create_leaves_last_used_at_unset() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (row, _password) = service
        .create("metrics-agent", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    assert!(row.last_used_at.is_none());
}

#[tokio::test]
async fn record_usage_stamps_last_used_at() {
    let db = support::setup_test_db().await;
    let service = service(db);

    let (row, _password) = service
        .create("metrics-agent", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    service.record_usage(row.user_id).await.unwrap();

    let reloaded = service.get(row.id).await.unwrap();
    assert!(reloaded.last_used_at.is_some());
}

#[tokio::test]
async fn create_rejects_a_duplicate_name() {
    let db = support::setup_test_db().await;
    let service = service(db);

    service
        .create("billing-worker", None, "worker", None, Uuid::new_v4())
        .await
        .unwrap();

    let err = service
        .create("billing-worker", Some("other-app".into()), "worker", None, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, iam_systemuser::SystemUserError::Database(_)));
}

#[test]
fn is_authenticatable_rejects_inactive_or_expired() {
    use chrono::{Duration, Utc};

    assert!(is_authenticatable(true, None));
    assert!(!is_authenticatable(false, None));
    assert!(is_authenticatable(true, Some((Utc::now() + Duration::days(1)).fixed_offset())));
    assert!(!is_authenticatable(true, Some((Utc::now() - Duration::days(1)).fixed_offset())));
}

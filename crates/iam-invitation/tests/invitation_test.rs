mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use iam_invitation::{invitation, InvitationError, InvitationService, InvitationStatus};
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait};
use support::RecordingEmailEnqueuer;
use uuid::Uuid;

fn service(db: sea_orm::DatabaseConnection) -> (InvitationService, Arc<RecordingEmailEnqueuer>) {
    let enqueuer = Arc::new(RecordingEmailEnqueuer::default());
    let service = InvitationService::new(db, 72, "https://app.example/accept".into(), enqueuer.clone());
    (service, enqueuer)
}

#[tokio::test]
async fn create_then_accept_inserts_a_member() {
    let db = support::setup_test_db().await;
    let (service, enqueuer) = service(db);
    let tenant_id = Uuid::new_v4();
    let role_id = Uuid::new_v4();
    let inviter = Uuid::new_v4();

    let (invitation, token) = service
        .create(tenant_id, "Alice@Example.com", role_id, inviter)
        .await
        .unwrap();
    assert_eq!(invitation.email, "alice@example.com");
    assert_eq!(enqueuer.enqueued.lock().unwrap().len(), 1);

    let user_id = Uuid::new_v4();
    let member = service
        .accept(&token, user_id, "alice@example.com")
        .await
        .unwrap();
    assert_eq!(member.tenant_id, tenant_id);
    assert_eq!(member.role_id, role_id);
}

#[tokio::test]
async fn duplicate_active_invitation_is_rejected() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db);
    let tenant_id = Uuid::new_v4();

    service
        .create(tenant_id, "bob@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    let err = service
        .create(tenant_id, "bob@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::Duplicate));
}

#[tokio::test]
async fn accept_rejects_email_mismatch() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db);

    let (_invitation, token) = service
        .create(Uuid::new_v4(), "carol@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    let err = service
        .accept(&token, Uuid::new_v4(), "mallory@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::EmailMismatch));
}

#[tokio::test]
async fn re_accepting_an_accepted_invitation_is_idempotent_error() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db);

    let (_invitation, token) = service
        .create(Uuid::new_v4(), "dave@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    service
        .accept(&token, Uuid::new_v4(), "dave@example.com")
        .await
        .unwrap();

    let err = service
        .accept(&token, Uuid::new_v4(), "dave@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::AlreadyAccepted));
}

#[tokio::test]
async fn cancel_only_succeeds_from_pending() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db);

    let (invitation, _token) = service
        .create(Uuid::new_v4(), "erin@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    let cancelled = service.cancel(invitation.id).await.unwrap();
    assert_eq!(cancelled.status, InvitationStatus::Cancelled);

    let err = service.cancel(invitation.id).await.unwrap_err();
    assert!(matches!(err, InvitationError::NotPending(_)));
}

#[tokio::test]
async fn get_by_token_lazily_expires_a_stale_pending_invitation() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db.clone());

    let (invitation, token) = service
        .create(Uuid::new_v4(), "frank@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    let mut active: invitation::ActiveModel = invitation.into();
    active.expires_at = ActiveValue::Set(Utc::now().fixed_offset() - Duration::hours(1));
    active.update(&db).await.unwrap();

    let fetched = service.get_by_token(&token).await.unwrap();
    assert_eq!(fetched.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn auto_accept_pending_accepts_every_matching_invitation() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db);
    let user_id = Uuid::new_v4();

    service
        .create(Uuid::new_v4(), "grace@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    service
        .create(Uuid::new_v4(), "grace@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    let accepted = service.auto_accept_pending("grace@example.com", user_id).await.unwrap();
    assert_eq!(accepted.len(), 2);
}

#[tokio::test]
async fn sweep_expired_flips_stale_pending_rows() {
    let db = support::setup_test_db().await;
    let (service, _enqueuer) = service(db.clone());

    let (invitation, _token) = service
        .create(Uuid::new_v4(), "heidi@example.com", Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    let mut active: invitation::ActiveModel = invitation.into();
    active.expires_at = ActiveValue::Set(Utc::now().fixed_offset() - Duration::hours(1));
    active.update(&db).await.unwrap();

    let swept = service.sweep_expired().await.unwrap();
    assert_eq!(swept, 1);

    let reloaded = invitation::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(reloaded.status, InvitationStatus::Expired);
}

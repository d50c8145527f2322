use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::SchemaManager;
use sea_orm_migration::MigrationTrait;
use uuid::Uuid;

use iam_invitation::migration::InvitationsMigration;
use iam_jobs::migration::JobsMigration;
use iam_jobs::{EmailDispatcher, TenantNotifier};
use iam_membership::migration::TenantMembersMigration;
use iam_tenant::migration::TenantsMigration;
use iam_tenant::{AdminInvitationIssuer, TenantError, TenantInitEnqueuer};

pub async fn setup_test_db() -> DatabaseConnection {
    let db_url = format!("sqlite:file:iam_jobs_{}?mode=memory&cache=shared", Uuid::new_v4());
    let mut opts = ConnectOptions::new(db_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to connect test sqlite database");

    let schema_manager = SchemaManager::new(&db);
    JobsMigration
        .up(&schema_manager)
        .await
        .expect("failed to run jobs migration");
    TenantsMigration
        .up(&schema_manager)
        .await
        .expect("failed to run tenants migration");
    TenantMembersMigration
        .up(&schema_manager)
        .await
        .expect("failed to run tenant_members migration");
    InvitationsMigration
        .up(&schema_manager)
        .await
        .expect("failed to run invitations migration");

    db
}

/// No-op collaborators for building a `TenantService` in tests that only
/// exercise the job runtime, not `iam-tenant`'s own enqueue/invite calls.
#[derive(Default)]
pub struct NoopEnqueuer;

#[async_trait]
impl TenantInitEnqueuer for NoopEnqueuer {
    async fn enqueue_tenant_init(&self, _tenant_id: Uuid) -> Result<(), TenantError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct NoopInvitationIssuer;

#[async_trait]
impl AdminInvitationIssuer for NoopInvitationIssuer {
    async fn invite_admin(&self, _tenant_id: Uuid, _admin_email: &str) -> Result<(), TenantError> {
        Ok(())
    }
}

/// Records every downstream notification instead of making an HTTP call;
/// `fail_urls` lets a test make a specific url fail once so retry/backoff
/// behavior is observable.
#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<(String, Uuid)>>,
    pub fail_urls: Mutex<Vec<String>>,
}

#[async_trait]
impl TenantNotifier for RecordingNotifier {
    async fn notify(&self, url: &str, tenant_id: Uuid) -> Result<(), String> {
        self.calls.lock().unwrap().push((url.to_string(), tenant_id));
        let mut fail_urls = self.fail_urls.lock().unwrap();
        if let Some(pos) = fail_urls.iter().position(|u| u == url) {
            fail_urls.remove(pos);
            return Err(format!("{url} unavailable"));
        }
        Ok(())
    }
}

/// Records every email dispatch instead of sending one.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailDispatcher for RecordingDispatcher {
    async fn send_invitation_email(&self, to: &str, acceptance_url: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push((to.to_string(), acceptance_url.to_string()));
        Ok(())
    }
}

/// Always fails, to exercise retry/dead-letter behavior deterministically.
#[derive(Default)]
pub struct FailingDispatcher;

#[async_trait]
impl EmailDispatcher for FailingDispatcher {
    async fn send_invitation_email(&self, _to: &str, _acceptance_url: &str) -> Result<(), String> {
        Err("smtp unreachable".into())
    }
}

use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::SchemaManager;
use sea_orm_migration::MigrationTrait;
use uuid::Uuid;

use iam_membership::migration::TenantMembersMigration;
use iam_tenant::migration::TenantsMigration;
use iam_tenant::{AdminInvitationIssuer, TenantError, TenantInitEnqueuer};

pub async fn setup_test_db() -> DatabaseConnection {
    let db_url = format!("sqlite:file:iam_tenant_{}?mode=memory&cache=shared", Uuid::new_v4());
    let mut opts = ConnectOptions::new(db_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to connect test sqlite database");

    let schema_manager = SchemaManager::new(&db);
    TenantsMigration
        .up(&schema_manager)
        .await
        .expect("failed to run tenants migration");
    TenantMembersMigration
        .up(&schema_manager)
        .await
        .expect("failed to run tenant_members migration");

    db
}

/// Records every enqueue call instead of talking to a real queue.
#[derive(Default)]
pub struct RecordingEnqueuer {
    pub enqueued: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl TenantInitEnqueuer for RecordingEnqueuer {
    async fn enqueue_tenant_init(&self, tenant_id: Uuid) -> Result<(), TenantError> {
        self.enqueued.lock().unwrap().push(tenant_id);
        Ok(())
    }
}

/// Records every invitation issue request instead of calling iam-invitation.
#[derive(Default)]
pub struct RecordingInvitationIssuer {
    pub invited: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl AdminInvitationIssuer for RecordingInvitationIssuer {
    async fn invite_admin(&self, tenant_id: Uuid, admin_email: &str) -> Result<(), TenantError> {
        self.invited
            .lock()
            .unwrap()
            .push((tenant_id, admin_email.to_string()));
        Ok(())
    }
}

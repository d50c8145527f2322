use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::SchemaManager;
use sea_orm_migration::MigrationTrait;
use uuid::Uuid;

use iam_invitation::migration::InvitationsMigration;
use iam_invitation::InvitationError;
use iam_invitation::InvitationEmailEnqueuer;
use iam_membership::migration::TenantMembersMigration;

pub async fn setup_test_db() -> DatabaseConnection {
    let db_url = format!("sqlite:file:iam_invitation_{}?mode=memory&cache=shared", Uuid::new_v4());
    let mut opts = ConnectOptions::new(db_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to connect test sqlite database");

    let schema_manager = SchemaManager::new(&db);
    InvitationsMigration
        .up(&schema_manager)
        .await
        .expect("failed to run invitations migration");
    TenantMembersMigration
        .up(&schema_manager)
        .await
        .expect("failed to run tenant_members migration");

    db
}

/// Records every enqueue call instead of talking to a real queue.
#[derive(Default)]
pub struct RecordingEmailEnqueuer {
    pub enqueued: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl InvitationEmailEnqueuer for RecordingEmailEnqueuer {
    async fn enqueue_invitation_email(
        &self,
        invitation_id: Uuid,
        acceptance_url: String,
    ) -> Result<(), InvitationError> {
        self.enqueued
            .lock()
            .unwrap()
            .push((invitation_id, acceptance_url));
        Ok(())
    }
}

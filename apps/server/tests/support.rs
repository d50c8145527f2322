use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::SchemaManager;
use sea_orm_migration::MigrationTrait;
use uuid::Uuid;

use iam_core::EventBus;
use iam_identity::{IdentityClaims, IdentityError, IdentityProvider, SessionHandle, SessionMode};
use iam_invitation::migration::InvitationsMigration;
use iam_invitation::{InvitationEmailEnqueuer, InvitationError, InvitationService};
use iam_membership::migration::TenantMembersMigration;
use iam_membership::MembershipService;
use iam_rbac::entities::role;
use iam_rbac::{MokaPermissionCache, SeaOrmPermissionStore};
use iam_systemuser::SystemUserService;
use iam_tenant::migration::TenantsMigration;
use iam_tenant::{AdminInvitationIssuer, TenantError, TenantInitEnqueuer, TenantService};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use iam_server::state::AppState;

pub async fn setup_test_db() -> DatabaseConnection {
    let db_url = format!("sqlite:file:iam_server_{}?mode=memory&cache=shared", Uuid::new_v4());
    let mut opts = ConnectOptions::new(db_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to connect test sqlite database");

    let schema_manager = SchemaManager::new(&db);
    TenantsMigration.up(&schema_manager).await.expect("tenants migration");
    TenantMembersMigration
        .up(&schema_manager)
        .await
        .expect("tenant_members migration");
    InvitationsMigration
        .up(&schema_manager)
        .await
        .expect("invitations migration");
    iam_systemuser::migration::SystemUsersMigration
        .up(&schema_manager)
        .await
        .expect("system_users migration");
    iam_rbac::migration::RbacMigration
        .up(&schema_manager)
        .await
        .expect("rbac migration");

    db
}

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

#[derive(Default)]
pub struct NoopInvitationEmailEnqueuer;

#[async_trait]
impl InvitationEmailEnqueuer for NoopInvitationEmailEnqueuer {
    async fn enqueue_invitation_email(&self, _invitation_id: Uuid, _acceptance_url: String) -> Result<(), InvitationError> {
        Ok(())
    }
}

/// A directly-programmable [`IdentityProvider`] double: tests register
/// bearer tokens to whatever claims (human or system) they want the
/// pipeline to see, something `MemoryIdentityProvider` has no API for since
/// it only ever mints `human` claims through `issue_session`.
#[derive(Default)]
pub struct StubIdentityProvider {
    sessions: RwLock<HashMap<String, IdentityClaims>>,
}

impl StubIdentityProvider {
    pub fn register(&self, token: impl Into<String>, claims: IdentityClaims) {
        self.sessions.write().unwrap().insert(token.into(), claims);
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn sign_up_email_password(&self, _email: &str, _password: &str) -> Result<Uuid, IdentityError> {
        unimplemented!("not exercised by the pipeline tests")
    }

    async fn lookup_by_email(&self, _email: &str) -> Result<Uuid, IdentityError> {
        unimplemented!("not exercised by the pipeline tests")
    }

    async fn issue_session(&self, _user_id: Uuid, _mode: SessionMode) -> Result<SessionHandle, IdentityError> {
        unimplemented!("not exercised by the pipeline tests")
    }

    async fn authenticate_request(
        &self,
        bearer_token: Option<&str>,
        _cookie: Option<&str>,
    ) -> Result<IdentityClaims, IdentityError> {
        let token = bearer_token.ok_or(IdentityError::Unauthenticated)?;
        self.sessions
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthenticated)
    }

    async fn revoke_all_sessions(&self, _user_id: Uuid) -> Result<(), IdentityError> {
        unimplemented!("not exercised by the pipeline tests")
    }

    async fn reset_password(&self, _user_id: Uuid, _new_password: &str) -> Result<(), IdentityError> {
        unimplemented!("not exercised by the pipeline tests")
    }

    fn generate_machine_password(&self) -> String {
        "unused".to_string()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub identity: Arc<StubIdentityProvider>,
    pub admin_role_id: Uuid,
}

pub async fn build_test_app() -> TestApp {
    let db = setup_test_db().await;
    iam_rbac::seed::seed(&db).await.expect("seed rbac catalog");
    let admin_role_id = role::Entity::find()
        .filter(role::Column::Name.eq("Admin"))
        .one(&db)
        .await
        .expect("query admin role")
        .expect("seed creates an Admin role")
        .id;

    let identity = Arc::new(StubIdentityProvider::default());
    let identity_dyn: Arc<dyn IdentityProvider> = identity.clone();

    let rbac_store = Arc::new(SeaOrmPermissionStore::new(db.clone()));
    let rbac_cache = Arc::new(MokaPermissionCache::default());
    let event_bus = Arc::new(EventBus::new());

    let invitation_service = Arc::new(InvitationService::new(
        db.clone(),
        72,
        "https://app.example/accept".to_string(),
        Arc::new(NoopInvitationEmailEnqueuer),
    ));
    let tenant_service = Arc::new(TenantService::new(
        db.clone(),
        admin_role_id,
        Arc::new(NoopEnqueuer),
        Arc::new(NoopInvitationIssuer),
    ));
    let membership_service = Arc::new(MembershipService::new(db.clone(), admin_role_id));
    let systemuser_service = Arc::new(SystemUserService::new(db.clone(), identity_dyn.clone()));

    let state = AppState {
        db,
        identity: identity_dyn,
        rbac_store,
        rbac_cache,
        event_bus,
        tenant_service,
        membership_service,
        invitation_service,
        systemuser_service,
        admin_role_id,
    };

    TestApp {
        state,
        identity,
        admin_role_id,
    }
}

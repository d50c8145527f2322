use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ColumnTrait, ConnectOptions, Database, EntityTrait, QueryFilter};
use sea_orm_migration::{MigrationTrait, SchemaManager};
use uuid::Uuid;

use iam_core::config::{Config, ConfigLoader, ConfigSource};
use iam_core::{init_tracing, EventBus};
use iam_identity::{IdentityProvider, MemoryIdentityProvider};
use iam_invitation::InvitationService;
use iam_jobs::tasks::invitation_email::{InvitationEmailRunner, JobInvitationEmailEnqueuer, NoopEmailDispatcher};
use iam_jobs::tasks::tenant_init::{JobTenantInitEnqueuer, ReqwestTenantNotifier, TenantInitRunner};
use iam_jobs::{JobQueue, SeaOrmJobQueue};
use iam_membership::MembershipService;
use iam_rbac::entities::role;
use iam_rbac::{MokaPermissionCache, SeaOrmPermissionStore};
use iam_systemuser::SystemUserService;
use iam_tenant::TenantService;

use iam_server::collaborators::InvitationBackedAdminIssuer;
use iam_server::routes;
use iam_server::state::AppState;

const WORKER_ID: &str = "iam-server";
const BATCH_SIZE: u64 = 25;
const WORKER_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ConfigLoader::new()
        .with_source(ConfigSource::env())
        .load::<iam_core::config::AppConfig>()?;

    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(20).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;

    run_migrations(&db).await?;
    iam_rbac::seed::seed(&db).await?;
    let admin_role_id = find_role_id(&db, "Admin").await?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentityProvider::new());
    let rbac_store = Arc::new(SeaOrmPermissionStore::new(db.clone()));
    let rbac_cache = Arc::new(MokaPermissionCache::default());
    let event_bus = Arc::new(EventBus::new());

    tokio::spawn({
        let event_bus = event_bus.clone();
        let cache = rbac_cache.clone();
        async move { iam_rbac::run_cache_invalidator(&event_bus, cache).await }
    });

    let job_queue: Arc<dyn JobQueue> = Arc::new(SeaOrmJobQueue::new(db.clone()));

    let invitation_email_enqueuer = Arc::new(JobInvitationEmailEnqueuer::new(job_queue.clone()));
    let invitation_service = Arc::new(InvitationService::new(
        db.clone(),
        config.invitation_ttl_hours,
        config.invitation_base_url.clone(),
        invitation_email_enqueuer,
    ));

    let admin_issuer = Arc::new(InvitationBackedAdminIssuer::new(invitation_service.clone(), admin_role_id));
    let tenant_init_enqueuer = Arc::new(JobTenantInitEnqueuer::new(job_queue.clone()));
    let tenant_service = Arc::new(TenantService::new(
        db.clone(),
        admin_role_id,
        tenant_init_enqueuer,
        admin_issuer,
    ));

    let membership_service = Arc::new(MembershipService::new(db.clone(), admin_role_id));
    let systemuser_service = Arc::new(SystemUserService::new(db.clone(), identity.clone()));

    spawn_tenant_init_worker(job_queue.clone(), tenant_service.clone(), event_bus.clone(), &config);
    spawn_invitation_email_worker(job_queue.clone(), invitation_service.clone());

    let state = AppState {
        db,
        identity,
        rbac_store,
        rbac_cache,
        event_bus,
        tenant_service,
        membership_service,
        invitation_service,
        systemuser_service,
        admin_role_id,
    };

    let router = routes::router(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

async fn run_migrations(db: &sea_orm::DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    let manager = SchemaManager::new(db);
    iam_tenant::migration::TenantsMigration.up(&manager).await?;
    iam_membership::migration::TenantMembersMigration.up(&manager).await?;
    iam_invitation::migration::InvitationsMigration.up(&manager).await?;
    iam_systemuser::migration::SystemUsersMigration.up(&manager).await?;
    iam_rbac::migration::RbacMigration.up(&manager).await?;
    iam_jobs::migration::JobsMigration.up(&manager).await?;
    Ok(())
}

async fn find_role_id(db: &sea_orm::DatabaseConnection, name: &str) -> Result<Uuid, sea_orm::DbErr> {
    let found = role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await?
        .unwrap_or_else(|| panic!("seed() did not create the '{name}' role"));
    Ok(found.id)
}

fn spawn_tenant_init_worker(
    queue: Arc<dyn JobQueue>,
    tenant_service: Arc<TenantService>,
    event_bus: Arc<EventBus>,
    config: &iam_core::config::AppConfig,
) {
    let notifier = Arc::new(ReqwestTenantNotifier::new(reqwest::Client::new()));
    let service_urls = config.tenant_init_service_urls.clone();
    let runner = TenantInitRunner::new(queue, tenant_service, notifier, service_urls, event_bus);
    tokio::spawn(async move {
        loop {
            match runner.run_once(WORKER_ID, BATCH_SIZE).await {
                Ok(processed) if processed > 0 => tracing::debug!(processed, "tenant_init batch processed"),
                Ok(_) => {}
                Err(err) => tracing::error!(%err, "tenant_init worker failed to claim batch"),
            }
            tokio::time::sleep(WORKER_POLL_INTERVAL).await;
        }
    });
}

fn spawn_invitation_email_worker(queue: Arc<dyn JobQueue>, invitation_service: Arc<InvitationService>) {
    let dispatcher = Arc::new(NoopEmailDispatcher);
    let runner = InvitationEmailRunner::new(queue, invitation_service, dispatcher);
    tokio::spawn(async move {
        loop {
            match runner.run_once(WORKER_ID, BATCH_SIZE).await {
                Ok(processed) if processed > 0 => tracing::debug!(processed, "invitation_email batch processed"),
                Ok(_) => {}
                Err(err) => tracing::error!(%err, "invitation_email worker failed to claim batch"),
            }
            tokio::time::sleep(WORKER_POLL_INTERVAL).await;
        }
    });
}

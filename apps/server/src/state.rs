use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use iam_core::EventBus;
use iam_identity::IdentityProvider;
use iam_invitation::InvitationService;
use iam_membership::MembershipService;
use iam_rbac::{MokaPermissionCache, SeaOrmPermissionStore};
use iam_systemuser::SystemUserService;
use iam_tenant::TenantService;

/// Everything a handler or extractor needs, assembled once at startup
/// (spec §9). Cheap to clone: every field is an `Arc` or (for
/// `DatabaseConnection`, which sea-orm already pools internally) already
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub identity: Arc<dyn IdentityProvider>,
    pub rbac_store: Arc<SeaOrmPermissionStore>,
    pub rbac_cache: Arc<MokaPermissionCache>,
    pub event_bus: Arc<EventBus>,
    pub tenant_service: Arc<TenantService>,
    pub membership_service: Arc<MembershipService>,
    pub invitation_service: Arc<InvitationService>,
    pub systemuser_service: Arc<SystemUserService>,
    pub admin_role_id: Uuid,
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TenantError;

/// Enqueues the tenant-initialization workflow (spec §4.4/§4.8). Implemented
/// by iam-jobs; kept as a trait here so iam-tenant never depends on the job
/// runtime — C8 is built on top of C4, not the other way around.
#[async_trait]
pub trait TenantInitEnqueuer: Send + Sync {
    async fn enqueue_tenant_init(&self, tenant_id: Uuid) -> Result<(), TenantError>;
}

/// Creates a pending invitation for a managed tenant's first admin (spec
/// §4.4 `CreateManaged`). Implemented by iam-invitation; same rationale as
/// [`TenantInitEnqueuer`].
#[async_trait]
pub trait AdminInvitationIssuer: Send + Sync {
    async fn invite_admin(&self, tenant_id: Uuid, admin_email: &str) -> Result<(), TenantError>;
}

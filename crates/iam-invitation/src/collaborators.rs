use async_trait::async_trait;
use uuid::Uuid;

use crate::error::InvitationError;

/// Enqueues the invitation-email task (spec §4.6/§4.8). Implemented by
/// iam-jobs; kept as a trait here for the same reason as iam-tenant's
/// `TenantInitEnqueuer` — C8 depends on C6, not the reverse.
#[async_trait]
pub trait InvitationEmailEnqueuer: Send + Sync {
    async fn enqueue_invitation_email(
        &self,
        invitation_id: Uuid,
        acceptance_url: String,
    ) -> Result<(), InvitationError>;
}

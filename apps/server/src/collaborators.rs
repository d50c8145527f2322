use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use iam_invitation::InvitationService;
use iam_tenant::{AdminInvitationIssuer, TenantError};

/// Implements `iam_tenant::AdminInvitationIssuer` by issuing a real
/// invitation through C8 — the composition root's job, since neither crate
/// may depend on the other (C8 sits on top of C4, not beside it).
pub struct InvitationBackedAdminIssuer {
    invitation_service: Arc<InvitationService>,
    admin_role_id: Uuid,
}

impl InvitationBackedAdminIssuer {
    pub fn new(invitation_service: Arc<InvitationService>, admin_role_id: Uuid) -> Self {
        Self {
            invitation_service,
            admin_role_id,
        }
    }
}

#[async_trait]
impl AdminInvitationIssuer for InvitationBackedAdminIssuer {
    async fn invite_admin(&self, tenant_id: Uuid, admin_email: &str) -> Result<(), TenantError> {
        self.invitation_service
            .create(tenant_id, admin_email, self.admin_role_id, Uuid::nil())
            .await
            .map(|_| ())
            .map_err(|err| TenantError::Database(sea_orm::DbErr::Custom(err.to_string())))
    }
}

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use iam_membership::tenant_member::MemberStatus;
use iam_rbac::RelationPermissionStore;

use crate::error::ApiError;
use crate::extractors::auth::CurrentUser;
use crate::state::AppState;

/// Stage 3 of the request pipeline (spec §4.9): resolves `tenant_id` from
/// the route path, then requires either platform-admin standing or an
/// active membership row. Platform admins bypass the membership check
/// entirely, same as the permission check does at stage 4.
#[derive(Debug, Clone)]
pub struct CurrentTenant {
    pub tenant_id: Uuid,
    pub user: CurrentUser,
    pub is_platform_admin: bool,
}

impl FromRequestParts<AppState> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(tenant_id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| iam_core::Error::Validation("missing or invalid tenant_id path segment".into()))?;
        let user = CurrentUser::from_request_parts(parts, state).await?;

        let is_platform_admin = state
            .rbac_store
            .is_platform_admin(user.user_id)
            .await
            .map_err(iam_core::Error::from)?;
        if is_platform_admin {
            return Ok(Self {
                tenant_id,
                user,
                is_platform_admin: true,
            });
        }

        let member = state
            .membership_service
            .get_by_tenant_user(tenant_id, user.user_id)
            .await
            .map_err(iam_core::Error::from)?;

        match member {
            Some(member) if member.status == MemberStatus::Active => Ok(Self {
                tenant_id,
                user,
                is_platform_admin: false,
            }),
            _ => Err(iam_core::Error::Forbidden("not an active member of this tenant".into()).into()),
        }
    }
}

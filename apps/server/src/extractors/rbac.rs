use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use iam_rbac::{authorize, Permission, RelationPermissionStore};

use crate::error::ApiError;
use crate::extractors::tenant::CurrentTenant;
use crate::state::AppState;

/// Stage 4 of the request pipeline (spec §4.9): `Authorize(user_id,
/// tenant_id, service, entity, action)`. The platform-admin bypass is
/// internal to [`authorize`] itself (spec §4.3 step 1) so it is not
/// duplicated here.
pub async fn check_permission(
    state: &AppState,
    user_id: Uuid,
    tenant_id: Uuid,
    permission: &Permission,
) -> Result<bool, iam_core::Error> {
    authorize(
        state.rbac_store.as_ref(),
        state.rbac_cache.as_ref(),
        user_id,
        tenant_id,
        permission,
    )
    .await
    .map_err(iam_core::Error::from)
}

/// A route's fixed `(service, entity, action)` triple. Implemented by a
/// marker type per protected route, analogous to the teacher's
/// `define_permission_extractor!`-generated wrapper types but expressed as
/// a generic extractor over a trait instead of one macro invocation per
/// permission.
pub trait PermissionSpec: Send + Sync + 'static {
    fn permission() -> Permission;
}

/// Extracts [`CurrentTenant`] (stages 1-3) then denies unless the caller
/// holds `P::permission()` in that tenant.
pub struct RequirePermission<P: PermissionSpec> {
    pub tenant: CurrentTenant,
    _marker: PhantomData<P>,
}

impl<P: PermissionSpec> FromRequestParts<AppState> for RequirePermission<P> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let tenant = CurrentTenant::from_request_parts(parts, state).await?;

        let permission = P::permission();
        let allowed = check_permission(state, tenant.user.user_id, tenant.tenant_id, &permission).await?;
        if !allowed {
            return Err(iam_core::Error::Forbidden(format!("missing permission {permission}")).into());
        }

        Ok(Self {
            tenant,
            _marker: PhantomData,
        })
    }
}

/// Gate for `/platform/**` routes (spec §6): authenticated plus a member of
/// the platform-admin set, with no tenant in scope at all.
pub struct RequirePlatformAdmin {
    pub user: crate::extractors::auth::CurrentUser,
}

impl FromRequestParts<AppState> for RequirePlatformAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = crate::extractors::auth::CurrentUser::from_request_parts(parts, state).await?;
        let is_platform_admin = state
            .rbac_store
            .is_platform_admin(user.user_id)
            .await
            .map_err(iam_core::Error::from)?;
        if !is_platform_admin {
            return Err(iam_core::Error::Forbidden("platform admin required".into()).into());
        }
        Ok(Self { user })
    }
}

pub struct TenantUpdate;
impl PermissionSpec for TenantUpdate {
    fn permission() -> Permission {
        Permission::new("tenant-api", "tenant", "update")
    }
}

pub struct TenantDelete;
impl PermissionSpec for TenantDelete {
    fn permission() -> Permission {
        Permission::new("tenant-api", "tenant", "delete")
    }
}

pub struct MemberCreate;
impl PermissionSpec for MemberCreate {
    fn permission() -> Permission {
        Permission::new("tenant-api", "member", "create")
    }
}

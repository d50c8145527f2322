use uuid::Uuid;

use crate::cache::PermissionCache;
use crate::permission::{normalize_permissions, Permission};
use crate::store::RelationPermissionStore;

/// Result of a permission-set resolution, distinguishing cache hits from
/// misses the way the teacher's resolver does, for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResolution {
    pub permissions: Vec<Permission>,
    pub cache_hit: bool,
}

/// Spec §4.3 steps 2-4: member's role -> role_policies -> policy_permissions.
/// Does not apply the platform-admin bypass (step 1); that is checked
/// separately by [`authorize`] and [`list_user_permissions`].
async fn resolve_from_relations<S: RelationPermissionStore>(
    store: &S,
    tenant_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Permission>, S::Error> {
    let Some(role_id) = store.active_member_role_id(tenant_id, user_id).await? else {
        return Ok(Vec::new());
    };

    let policy_ids = store.load_policy_ids_for_role(role_id).await?;
    if policy_ids.is_empty() {
        return Ok(Vec::new());
    }

    let permissions = store.load_permissions_for_policies(&policy_ids).await?;
    Ok(normalize_permissions(permissions))
}

async fn resolve_with_cache<S, C>(
    store: &S,
    cache: &C,
    tenant_id: Uuid,
    user_id: Uuid,
) -> Result<PermissionResolution, S::Error>
where
    S: RelationPermissionStore,
    C: PermissionCache,
{
    if let Some(cached) = cache.get(tenant_id, user_id).await {
        return Ok(PermissionResolution {
            permissions: normalize_permissions(cached),
            cache_hit: true,
        });
    }

    let permissions = resolve_from_relations(store, tenant_id, user_id).await?;
    cache.insert(tenant_id, user_id, permissions.clone()).await;
    Ok(PermissionResolution {
        permissions,
        cache_hit: false,
    })
}

/// `Authorize(user_id, tenant_id, service, entity, action) -> bool` per
/// spec §4.3. Exact triple match only: no wildcards, no collapsing.
pub async fn authorize<S, C>(
    store: &S,
    cache: &C,
    user_id: Uuid,
    tenant_id: Uuid,
    permission: &Permission,
) -> Result<bool, S::Error>
where
    S: RelationPermissionStore,
    C: PermissionCache,
{
    if store.is_platform_admin(user_id).await? {
        return Ok(true);
    }

    let resolution = resolve_with_cache(store, cache, tenant_id, user_id).await?;
    Ok(resolution.permissions.binary_search(permission).is_ok())
}

/// `ListUserPermissions(user_id, tenant_id) -> Set<Permission>` per spec
/// §4.3: read-only, same path through step 4, platform admins included
/// rather than special-cased (there is no finite set to list for "all
/// permissions"; callers that need the bypass check it separately).
pub async fn list_user_permissions<S, C>(
    store: &S,
    cache: &C,
    user_id: Uuid,
    tenant_id: Uuid,
) -> Result<Vec<Permission>, S::Error>
where
    S: RelationPermissionStore,
    C: PermissionCache,
{
    let resolution = resolve_with_cache(store, cache, tenant_id, user_id).await?;
    Ok(resolution.permissions)
}

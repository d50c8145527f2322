use std::sync::Arc;

use iam_core::{DomainEvent, EventBus};

use crate::cache::PermissionCache;

/// Subscribes to [`EventBus`] and keeps the permission cache coherent with
/// mutations from C5/C6/C7 (spec §4.3 "any write... MUST invalidate the
/// cache for affected keys"). Precise invalidation where the event names
/// the affected `(tenant_id, user_id)`; a full flush for events whose
/// blast radius isn't known at the cache layer (a role's policy set
/// changing, or the platform-admin set changing).
pub async fn run_cache_invalidator<C>(event_bus: &EventBus, cache: Arc<C>)
where
    C: PermissionCache + 'static,
{
    let mut receiver = event_bus.subscribe();
    loop {
        match receiver.recv().await {
            Ok(envelope) => apply_invalidation(&envelope.event, &cache).await,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                // Missed events: we can no longer trust targeted invalidation.
                cache.invalidate_all().await;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn apply_invalidation<C: PermissionCache>(event: &DomainEvent, cache: &C) {
    if let Some((tenant_id, user_id)) = event.affected_permission_key() {
        cache.invalidate(tenant_id, user_id).await;
        return;
    }

    match event {
        DomainEvent::RolePermissionsChanged { .. } => cache.invalidate_all().await,
        DomainEvent::PlatformAdminGranted { user_id } | DomainEvent::PlatformAdminRevoked { user_id } => {
            cache.invalidate_user(*user_id).await;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MokaPermissionCache;
    use crate::permission::Permission;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn member_role_changed_invalidates_exact_key() {
        let cache = Arc::new(MokaPermissionCache::new(Duration::from_secs(60)));
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        cache
            .insert(tenant_id, user_id, vec![Permission::new("a", "b", "c")])
            .await;

        apply_invalidation(
            &DomainEvent::MemberRoleChanged { tenant_id, user_id },
            cache.as_ref(),
        )
        .await;

        assert_eq!(cache.get(tenant_id, user_id).await, None);
    }

    #[tokio::test]
    async fn role_permissions_changed_flushes_everything() {
        let cache = Arc::new(MokaPermissionCache::new(Duration::from_secs(60)));
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        cache
            .insert(tenant_id, user_id, vec![Permission::new("a", "b", "c")])
            .await;

        apply_invalidation(
            &DomainEvent::RolePermissionsChanged { role_id: Uuid::new_v4() },
            cache.as_ref(),
        )
        .await;

        assert_eq!(cache.get(tenant_id, user_id).await, None);
    }

    #[tokio::test]
    async fn unrelated_event_leaves_cache_untouched() {
        let cache = Arc::new(MokaPermissionCache::new(Duration::from_secs(60)));
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let permissions = vec![Permission::new("a", "b", "c")];
        cache.insert(tenant_id, user_id, permissions.clone()).await;

        apply_invalidation(&DomainEvent::TenantCreated { tenant_id }, cache.as_ref()).await;

        assert_eq!(cache.get(tenant_id, user_id).await, Some(permissions));
    }
}

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use uuid::Uuid;

use crate::permission::Permission;

/// `(user_id, tenant_id)`-keyed cache of resolved permission sets, bounded
/// TTL per spec §4.3 (recommended ≤60s when invalidation can't be precise;
/// this implementation invalidates precisely via [`crate::integration`], so
/// the TTL is a backstop, not the primary correctness mechanism).
#[async_trait]
pub trait PermissionCache: Send + Sync {
    async fn get(&self, tenant_id: Uuid, user_id: Uuid) -> Option<Vec<Permission>>;
    async fn insert(&self, tenant_id: Uuid, user_id: Uuid, permissions: Vec<Permission>);
    async fn invalidate(&self, tenant_id: Uuid, user_id: Uuid);
    async fn invalidate_user(&self, user_id: Uuid);
    async fn invalidate_all(&self);
}

pub struct MokaPermissionCache {
    inner: Cache<(Uuid, Uuid), Vec<Permission>>,
}

impl MokaPermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).build(),
        }
    }
}

impl Default for MokaPermissionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[async_trait]
impl PermissionCache for MokaPermissionCache {
    async fn get(&self, tenant_id: Uuid, user_id: Uuid) -> Option<Vec<Permission>> {
        self.inner.get(&(tenant_id, user_id)).await
    }

    async fn insert(&self, tenant_id: Uuid, user_id: Uuid, permissions: Vec<Permission>) {
        self.inner.insert((tenant_id, user_id), permissions).await;
    }

    async fn invalidate(&self, tenant_id: Uuid, user_id: Uuid) {
        self.inner.invalidate(&(tenant_id, user_id)).await;
    }

    async fn invalidate_user(&self, user_id: Uuid) {
        self.inner
            .invalidate_entries_if(move |key, _| key.1 == user_id)
            .ok();
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use iam_membership::entities::tenant_member::{self, MemberStatus};

use crate::entities::{permission_row, platform_admin, policy_permission, role_policy};
use crate::error::RbacError;
use crate::permission::Permission;

/// Abstracts the relational reads the evaluator needs (spec §4.3 steps 1-4),
/// grounded on the teacher's `RelationPermissionStore` shape.
#[async_trait]
pub trait RelationPermissionStore {
    type Error;

    async fn is_platform_admin(&self, user_id: Uuid) -> Result<bool, Self::Error>;

    /// Returns the member's role id for `(tenant_id, user_id)`, or `None`
    /// if absent or not `active` (spec §4.3 step 2).
    async fn active_member_role_id(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, Self::Error>;

    async fn load_policy_ids_for_role(&self, role_id: Uuid) -> Result<Vec<Uuid>, Self::Error>;

    async fn load_permissions_for_policies(
        &self,
        policy_ids: &[Uuid],
    ) -> Result<Vec<Permission>, Self::Error>;
}

pub struct SeaOrmPermissionStore {
    db: DatabaseConnection,
}

impl SeaOrmPermissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RelationPermissionStore for SeaOrmPermissionStore {
    type Error = RbacError;

    async fn is_platform_admin(&self, user_id: Uuid) -> Result<bool, Self::Error> {
        Ok(platform_admin::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn active_member_role_id(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, Self::Error> {
        let member = tenant_member::Entity::find()
            .filter(tenant_member::Column::TenantId.eq(tenant_id))
            .filter(tenant_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(member.and_then(|m| (m.status == MemberStatus::Active).then_some(m.role_id)))
    }

    async fn load_policy_ids_for_role(&self, role_id: Uuid) -> Result<Vec<Uuid>, Self::Error> {
        let rows = role_policy::Entity::find()
            .filter(role_policy::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.policy_id).collect())
    }

    async fn load_permissions_for_policies(
        &self,
        policy_ids: &[Uuid],
    ) -> Result<Vec<Permission>, Self::Error> {
        if policy_ids.is_empty() {
            return Ok(Vec::new());
        }

        let permission_ids: Vec<Uuid> = policy_permission::Entity::find()
            .filter(policy_permission::Column::PolicyId.is_in(policy_ids.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.permission_id)
            .collect();

        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = permission_row::Entity::find()
            .filter(permission_row::Column::Id.is_in(permission_ids))
            .all(&self.db)
            .await?;

        Ok(rows.iter().map(permission_row::Model::as_permission).collect())
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use iam_core::{Page, PageRequest};

use crate::entities::tenant_member::{self, MemberStatus};
use crate::error::MembershipError;
use crate::repository;

/// Membership lifecycle (spec §4.5). `admin_role_id` is the system Admin
/// role's id (seeded by iam-rbac) — membership doesn't depend on iam-rbac's
/// entities, so the id is configuration, not a cross-crate type.
#[derive(Clone)]
pub struct MembershipService {
    db: DatabaseConnection,
    admin_role_id: Uuid,
}

impl MembershipService {
    pub fn new(db: DatabaseConnection, admin_role_id: Uuid) -> Self {
        Self { db, admin_role_id }
    }

    pub async fn add_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        invited_by: Option<Uuid>,
    ) -> Result<tenant_member::Model, MembershipError> {
        if repository::find_by_tenant_user(&self.db, tenant_id, user_id)
            .await?
            .is_some()
        {
            return Err(MembershipError::Duplicate);
        }

        repository::insert_member(
            &self.db,
            tenant_id,
            user_id,
            role_id,
            MemberStatus::Active,
            invited_by,
        )
        .await
        .map_err(|err| match err {
            DbErr::Query(_) | DbErr::Exec(_) if err.to_string().to_lowercase().contains("unique") => {
                MembershipError::Duplicate
            }
            other => MembershipError::Database(other),
        })
    }

    /// Counts active members holding `admin_role_id` in `tenant_id`,
    /// excluding `excluding_member_id` if given (the member about to be
    /// changed or removed) — spec §4.5 admin-survival invariant.
    async fn remaining_active_admins<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        excluding_member_id: Option<Uuid>,
    ) -> Result<u64, MembershipError> {
        let mut query = tenant_member::Entity::find()
            .filter(tenant_member::Column::TenantId.eq(tenant_id))
            .filter(tenant_member::Column::RoleId.eq(self.admin_role_id))
            .filter(tenant_member::Column::Status.eq(MemberStatus::Active));

        if let Some(member_id) = excluding_member_id {
            query = query.filter(tenant_member::Column::Id.ne(member_id));
        }

        Ok(query.count(conn).await?)
    }

    pub async fn update_member(
        &self,
        member_id: Uuid,
        new_role_id: Option<Uuid>,
        new_status: Option<MemberStatus>,
    ) -> Result<tenant_member::Model, MembershipError> {
        let txn = self.db.begin().await?;

        let member = tenant_member::Entity::find_by_id(member_id)
            .one(&txn)
            .await?
            .ok_or(MembershipError::NotFound)?;

        let leaves_admin_role = member.role_id == self.admin_role_id
            && member.status == MemberStatus::Active
            && (new_role_id.is_some_and(|r| r != self.admin_role_id)
                || new_status.is_some_and(|s| s != MemberStatus::Active));

        if leaves_admin_role {
            let remaining = self
                .remaining_active_admins(&txn, member.tenant_id, Some(member_id))
                .await?;
            if remaining == 0 {
                return Err(MembershipError::LastAdminRemoval);
            }
        }

        let now = Utc::now().fixed_offset();
        let mut active: tenant_member::ActiveModel = member.into();
        if let Some(role_id) = new_role_id {
            active.role_id = ActiveValue::Set(role_id);
        }
        if let Some(status) = new_status {
            active.status = ActiveValue::Set(status);
        }
        active.updated_at = ActiveValue::Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn remove_member(&self, member_id: Uuid) -> Result<(), MembershipError> {
        let txn = self.db.begin().await?;

        let member = tenant_member::Entity::find_by_id(member_id)
            .one(&txn)
            .await?
            .ok_or(MembershipError::NotFound)?;

        if member.role_id == self.admin_role_id && member.status == MemberStatus::Active {
            let remaining = self
                .remaining_active_admins(&txn, member.tenant_id, Some(member_id))
                .await?;
            if remaining == 0 {
                return Err(MembershipError::LastAdminRemoval);
            }
        }

        tenant_member::Entity::delete_by_id(member_id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<tenant_member::Model>, MembershipError> {
        let paginator = tenant_member::Entity::find()
            .filter(tenant_member::Column::TenantId.eq(tenant_id))
            .paginate(&self.db, page.page_size);

        let total_count = paginator.num_items().await?;
        let items = paginator.fetch_page(page.page - 1).await?;

        Ok(Page::new(items, page, total_count))
    }

    pub async fn get_by_tenant_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<tenant_member::Model>, MembershipError> {
        Ok(tenant_member::Entity::find()
            .filter(tenant_member::Column::TenantId.eq(tenant_id))
            .filter(tenant_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }
}

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use iam_core::{generate_id, guard_transition, security, Page, PageRequest};
use iam_membership::tenant_member::{self, MemberStatus};

use crate::collaborators::{AdminInvitationIssuer, TenantInitEnqueuer};
use crate::entities::tenant::{self, TenantStatus};
use crate::error::TenantError;

/// Fields a caller supplies when creating a tenant (spec §4.4). Shared by
/// both `create_self_serve` and `create_managed`.
#[derive(Debug, Clone)]
pub struct TenantInput {
    pub name: String,
    pub slug: String,
}

fn validate_input(input: &TenantInput) -> Result<(), TenantError> {
    if !security::validate_name_length(&input.name) {
        return Err(TenantError::InvalidName);
    }
    if !security::is_valid_slug(&input.slug) {
        return Err(TenantError::InvalidSlug);
    }
    Ok(())
}

/// Tenant lifecycle (spec §4.4). `admin_role_id` is the seeded system Admin
/// role id — same configuration-not-dependency approach as
/// [`iam_membership::MembershipService`].
#[derive(Clone)]
pub struct TenantService {
    db: DatabaseConnection,
    admin_role_id: Uuid,
    init_enqueuer: Arc<dyn TenantInitEnqueuer>,
    invitation_issuer: Arc<dyn AdminInvitationIssuer>,
}

impl TenantService {
    pub fn new(
        db: DatabaseConnection,
        admin_role_id: Uuid,
        init_enqueuer: Arc<dyn TenantInitEnqueuer>,
        invitation_issuer: Arc<dyn AdminInvitationIssuer>,
    ) -> Self {
        Self {
            db,
            admin_role_id,
            init_enqueuer,
            invitation_issuer,
        }
    }

    async fn check_slug_free<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
    ) -> Result<(), TenantError> {
        let exists = tenant::Entity::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(conn)
            .await?
            .is_some();
        if exists {
            return Err(TenantError::SlugTaken);
        }
        Ok(())
    }

    /// Creates a tenant and its creator's Admin membership in one
    /// transaction, then enqueues the tenant-init task (spec §4.4, §4.2).
    pub async fn create_self_serve(
        &self,
        input: TenantInput,
        creator_user_id: Uuid,
    ) -> Result<tenant::Model, TenantError> {
        validate_input(&input)?;

        let txn = self.db.begin().await?;
        self.check_slug_free(&txn, &input.slug).await?;

        let now = Utc::now().fixed_offset();
        let tenant = tenant::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            name: ActiveValue::Set(input.name),
            slug: ActiveValue::Set(input.slug),
            status: ActiveValue::Set(TenantStatus::Pending),
            metadata: ActiveValue::Set(json!({})),
            created_by: ActiveValue::Set(creator_user_id),
            deleted_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await?;

        iam_membership::repository::insert_member(
            &txn,
            tenant.id,
            creator_user_id,
            self.admin_role_id,
            MemberStatus::Active,
            None,
        )
        .await?;

        txn.commit().await?;

        self.init_enqueuer.enqueue_tenant_init(tenant.id).await?;
        Ok(tenant)
    }

    /// Creates a tenant with no initial member; the first Admin joins via
    /// invitation acceptance (spec §4.4). Caller-is-platform-admin is
    /// enforced by the pipeline (C9), not here.
    pub async fn create_managed(
        &self,
        input: TenantInput,
        admin_email: &str,
    ) -> Result<tenant::Model, TenantError> {
        validate_input(&input)?;
        if !security::is_valid_email(admin_email) {
            return Err(TenantError::InvalidName);
        }

        let txn = self.db.begin().await?;
        self.check_slug_free(&txn, &input.slug).await?;

        let now = Utc::now().fixed_offset();
        let tenant = tenant::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            name: ActiveValue::Set(input.name),
            slug: ActiveValue::Set(input.slug),
            status: ActiveValue::Set(TenantStatus::Pending),
            metadata: ActiveValue::Set(json!({})),
            created_by: ActiveValue::Set(Uuid::nil()),
            deleted_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.invitation_issuer
            .invite_admin(tenant.id, admin_email)
            .await?;
        self.init_enqueuer.enqueue_tenant_init(tenant.id).await?;
        Ok(tenant)
    }

    /// Standard-route lookup (spec §6, §8): soft-deleted tenants are never
    /// returned here. Platform-admin endpoints that need to see a deleted
    /// tenant go straight to the repository, not through this method.
    pub async fn get(&self, tenant_id: Uuid) -> Result<tenant::Model, TenantError> {
        tenant::Entity::find_by_id(tenant_id)
            .filter(tenant::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(TenantError::NotFound)
    }

    /// `GET /tenants` (spec §6): every non-deleted tenant the caller has an
    /// active membership in, newest first.
    pub async fn list_by_user(&self, user_id: Uuid, page: PageRequest) -> Result<Page<tenant::Model>, TenantError> {
        let tenant_ids: Vec<Uuid> = tenant_member::Entity::find()
            .filter(tenant_member::Column::UserId.eq(user_id))
            .filter(tenant_member::Column::Status.eq(MemberStatus::Active))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|member| member.tenant_id)
            .collect();

        if tenant_ids.is_empty() {
            return Ok(Page::new(Vec::new(), page, 0));
        }

        let paginator = tenant::Entity::find()
            .filter(tenant::Column::Id.is_in(tenant_ids))
            .filter(tenant::Column::DeletedAt.is_null())
            .order_by_desc(tenant::Column::CreatedAt)
            .paginate(&self.db, page.page_size);

        let total_count = paginator.num_items().await?;
        let items = paginator.fetch_page(page.page - 1).await?;
        Ok(Page::new(items, page, total_count))
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        name: Option<String>,
    ) -> Result<tenant::Model, TenantError> {
        let existing = self.get(tenant_id).await?;
        let mut active: tenant::ActiveModel = existing.into();
        if let Some(name) = name {
            if !security::validate_name_length(&name) {
                return Err(TenantError::InvalidName);
            }
            active.name = ActiveValue::Set(name);
        }
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Soft delete: marks `status=deleted`, stamps `deleted_at`. Membership
    /// preconditions (no active members besides the acting platform admin)
    /// are enforced by the pipeline per spec §4.4.
    pub async fn delete(&self, tenant_id: Uuid) -> Result<tenant::Model, TenantError> {
        let existing = self.get(tenant_id).await?;
        guard_transition(existing.status, TenantStatus::Deleted)
            .map_err(|err| TenantError::IllegalTransition(err.to_string()))?;

        let mut active: tenant::ActiveModel = existing.into();
        active.status = ActiveValue::Set(TenantStatus::Deleted);
        active.deleted_at = ActiveValue::Set(Some(Utc::now().fixed_offset()));
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Transitions status, enforcing the monotonic graph in
    /// [`TenantStatus::allowed_transitions`]. Used by iam-jobs to flip
    /// `pending -> active` once every downstream service acknowledges.
    pub async fn set_status(
        &self,
        tenant_id: Uuid,
        next: TenantStatus,
    ) -> Result<tenant::Model, TenantError> {
        let existing = self.get(tenant_id).await?;
        guard_transition(existing.status, next)
            .map_err(|err| TenantError::IllegalTransition(err.to_string()))?;

        let mut active: tenant::ActiveModel = existing.into();
        active.status = ActiveValue::Set(next);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Records per-downstream-service acknowledgement in `metadata`, used by
    /// iam-jobs' tenant-init task handler so `GetStatus` can report progress.
    pub async fn record_init_progress(
        &self,
        tenant_id: Uuid,
        service_url: &str,
        acknowledged: bool,
    ) -> Result<tenant::Model, TenantError> {
        let existing = self.get(tenant_id).await?;
        let mut metadata = existing.metadata.clone();
        metadata["init"][service_url] = json!(acknowledged);

        let mut active: tenant::ActiveModel = existing.into();
        active.metadata = ActiveValue::Set(metadata);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        Ok(active.update(&self.db).await?)
    }

    /// Current status plus per-downstream init state (spec §4.4, §4.8).
    pub async fn get_status(
        &self,
        tenant_id: Uuid,
    ) -> Result<(TenantStatus, serde_json::Value), TenantError> {
        let tenant = self.get(tenant_id).await?;
        let init = tenant.metadata.get("init").cloned().unwrap_or_else(|| json!({}));
        Ok((tenant.status, init))
    }
}

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use iam_core::generate_id;

use crate::entities::tenant_member::{self, MemberStatus};

/// Connection-generic reads/writes so callers that need tenant-creation and
/// member-insertion in one transaction (iam-tenant's `CreateSelfServe`, spec
/// §4.2) can run this against their own [`sea_orm::DatabaseTransaction`]
/// instead of going through [`crate::service::MembershipService`], which
/// owns its own connection.
pub async fn find_by_tenant_user<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    user_id: Uuid,
) -> Result<Option<tenant_member::Model>, DbErr> {
    tenant_member::Entity::find()
        .filter(tenant_member::Column::TenantId.eq(tenant_id))
        .filter(tenant_member::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

pub async fn insert_member<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
    status: MemberStatus,
    invited_by: Option<Uuid>,
) -> Result<tenant_member::Model, DbErr> {
    let now = Utc::now().fixed_offset();
    tenant_member::ActiveModel {
        id: ActiveValue::Set(generate_id()),
        tenant_id: ActiveValue::Set(tenant_id),
        user_id: ActiveValue::Set(user_id),
        role_id: ActiveValue::Set(role_id),
        status: ActiveValue::Set(status),
        invited_by: ActiveValue::Set(invited_by),
        joined_at: ActiveValue::Set(now),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
    .insert(conn)
    .await
}

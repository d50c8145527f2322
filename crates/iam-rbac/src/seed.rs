use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use iam_core::generate_id;

use crate::entities::{permission_row, policy, policy_permission, role, role_policy};
use crate::error::RbacError;
use crate::permission::Permission;

/// Four system roles seeded at bootstrap (spec §3 "must always exist").
pub const SYSTEM_ROLES: [&str; 4] = ["Admin", "Writer", "Viewer", "Basic"];

fn policy_name_for_role(role_name: &str) -> String {
    format!("{}-policy", role_name.to_ascii_lowercase())
}

/// Permission catalog from the endpoint table (spec §6). Each entry maps
/// the permission to the system policies that grant it.
fn permission_catalog() -> Vec<(Permission, &'static [&'static str])> {
    vec![
        (Permission::new("tenant-api", "tenant", "update"), &["Admin"]),
        (Permission::new("tenant-api", "tenant", "delete"), &["Admin"]),
        (
            Permission::new("tenant-api", "member", "create"),
            &["Admin", "Writer"],
        ),
        (
            Permission::new("tenant-api", "member", "update"),
            &["Admin", "Writer"],
        ),
        (Permission::new("tenant-api", "member", "delete"), &["Admin"]),
        (
            Permission::new("tenant-api", "invitation", "create"),
            &["Admin", "Writer"],
        ),
    ]
}

async fn find_or_insert_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Uuid, RbacError> {
    if let Some(existing) = role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let id = generate_id();
    role::Entity::insert(role::ActiveModel {
        id: ActiveValue::Set(id),
        name: ActiveValue::Set(name.to_string()),
        role_type: ActiveValue::Set(role::RoleType::System),
        tenant_id: ActiveValue::Set(None),
        is_system: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
    .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
    .exec_without_returning(db)
    .await?;

    Ok(id)
}

async fn find_or_insert_policy<C: ConnectionTrait>(
    db: &C,
    name: &str,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Uuid, RbacError> {
    if let Some(existing) = policy::Entity::find()
        .filter(policy::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let id = generate_id();
    policy::Entity::insert(policy::ActiveModel {
        id: ActiveValue::Set(id),
        name: ActiveValue::Set(name.to_string()),
        tenant_id: ActiveValue::Set(None),
        is_system: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
    .on_conflict(OnConflict::column(policy::Column::Name).do_nothing().to_owned())
    .exec_without_returning(db)
    .await?;

    Ok(id)
}

async fn find_or_insert_permission<C: ConnectionTrait>(
    db: &C,
    permission: &Permission,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Uuid, RbacError> {
    if let Some(existing) = permission_row::Entity::find()
        .filter(permission_row::Column::Service.eq(permission.service.clone()))
        .filter(permission_row::Column::Entity.eq(permission.entity.clone()))
        .filter(permission_row::Column::Action.eq(permission.action.clone()))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let id = generate_id();
    permission_row::Entity::insert(permission_row::ActiveModel {
        id: ActiveValue::Set(id),
        service: ActiveValue::Set(permission.service.clone()),
        entity: ActiveValue::Set(permission.entity.clone()),
        action: ActiveValue::Set(permission.action.clone()),
        created_at: ActiveValue::Set(now),
    })
    .on_conflict(
        OnConflict::columns([
            permission_row::Column::Service,
            permission_row::Column::Entity,
            permission_row::Column::Action,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    Ok(id)
}

/// Idempotently inserts the four system roles/policies and the permission
/// catalog, wiring role_policies/policy_permissions per
/// [`permission_catalog`]. Safe to run on every startup: existing rows are
/// looked up rather than re-inserted, so the join tables always wire the
/// actually-persisted ids, not a freshly generated one that loses an
/// on-conflict race.
pub async fn seed<C: ConnectionTrait>(db: &C) -> Result<(), RbacError> {
    let now = Utc::now().fixed_offset();

    let mut policy_ids = std::collections::HashMap::new();

    for role_name in SYSTEM_ROLES {
        let role_id = find_or_insert_role(db, role_name, now).await?;
        let policy_id = find_or_insert_policy(db, &policy_name_for_role(role_name), now).await?;

        role_policy::Entity::insert(role_policy::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            role_id: ActiveValue::Set(role_id),
            policy_id: ActiveValue::Set(policy_id),
            created_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::columns([role_policy::Column::RoleId, role_policy::Column::PolicyId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

        policy_ids.insert(role_name, policy_id);
    }

    for (permission, granted_to) in permission_catalog() {
        let permission_id = find_or_insert_permission(db, &permission, now).await?;

        for role_name in granted_to {
            let Some(policy_id) = policy_ids.get(role_name) else {
                continue;
            };
            policy_permission::Entity::insert(policy_permission::ActiveModel {
                id: ActiveValue::Set(generate_id()),
                policy_id: ActiveValue::Set(*policy_id),
                permission_id: ActiveValue::Set(permission_id),
                created_at: ActiveValue::Set(now),
            })
            .on_conflict(
                OnConflict::columns([
                    policy_permission::Column::PolicyId,
                    policy_permission::Column::PermissionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        }
    }

    Ok(())
}

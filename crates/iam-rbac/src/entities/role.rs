use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a role represents: a platform-wide catalog entry (`System`) seeded
/// at bootstrap, or a tenant-defined custom role (`Custom`). Spec §3's
/// "type" field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RoleType {
    #[sea_orm(string_value = "system")]
    System,
    #[sea_orm(string_value = "custom")]
    #[default]
    Custom,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub role_type: RoleType,
    pub tenant_id: Option<Uuid>,
    pub is_system: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use iam_core::StatusMachine;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TenantStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl StatusMachine for TenantStatus {
    /// `pending -> active -> (suspended <-> active) -> deleted` (spec §4.4).
    /// `deleted` is terminal: no resurrection via this service.
    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Active, Self::Deleted],
            Self::Active => &[Self::Suspended, Self::Deleted],
            Self::Suspended => &[Self::Active, Self::Deleted],
            Self::Deleted => &[],
        }
    }
}

/// `deleted` is soft (spec §3): `deleted_at` is set, `status` becomes
/// `Deleted`, and the slug remains reserved until a purge job runs (out of
/// scope here — no such job is specified).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub status: TenantStatus,
    pub metadata: Json,
    pub created_by: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

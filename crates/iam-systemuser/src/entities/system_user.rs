use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A system user is a real identity-provider account (synthetic email
/// `{name}@system.internal`) plus this domain row (spec §4.7). `user_id` is
/// the identity provider's account id, not this row's own primary key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub application_name: String,
    #[sea_orm(unique)]
    pub synthetic_email: String,
    pub service_type: String,
    pub description: Option<String>,
    pub is_primary: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub metadata: Json,
    pub created_by: Uuid,
    pub last_used_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// Storage row for a `Permission` triple (spec §3). Named `permission_row`
/// to keep the value type in [`crate::permission`] distinct from its
/// persisted shape.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service: String,
    pub entity: String,
    pub action: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn as_permission(&self) -> Permission {
        Permission::new(self.service.clone(), self.entity.clone(), self.action.clone())
    }
}

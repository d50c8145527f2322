use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use iam_core::StatusMachine;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl StatusMachine for InvitationStatus {
    /// `pending -> {accepted | expired | cancelled}`; every other state is
    /// terminal and absorbing (spec §4.6).
    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Expired, Self::Cancelled],
            Self::Accepted | Self::Expired | Self::Cancelled => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub role_id: Uuid,
    pub invited_by: Uuid,
    #[sea_orm(unique)]
    pub token_hash: String,
    pub status: InvitationStatus,
    pub expires_at: DateTimeWithTimeZone,
    pub accepted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

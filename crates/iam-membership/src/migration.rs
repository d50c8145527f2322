use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct TenantMembersMigration;

#[async_trait::async_trait]
impl MigrationTrait for TenantMembersMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TenantMembers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TenantMembers::TenantId).uuid().not_null())
                    .col(ColumnDef::new(TenantMembers::UserId).uuid().not_null())
                    .col(ColumnDef::new(TenantMembers::RoleId).uuid().not_null())
                    .col(ColumnDef::new(TenantMembers::Status).string_len(16).not_null())
                    .col(ColumnDef::new(TenantMembers::InvitedBy).uuid())
                    .col(
                        ColumnDef::new(TenantMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantMembers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenant_members_tenant_user")
                    .table(TenantMembers::Table)
                    .col(TenantMembers::TenantId)
                    .col(TenantMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantMembers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantMembers {
    Table,
    Id,
    TenantId,
    UserId,
    RoleId,
    Status,
    InvitedBy,
    JoinedAt,
    CreatedAt,
    UpdatedAt,
}

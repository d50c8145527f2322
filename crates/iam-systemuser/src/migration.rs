use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct SystemUsersMigration;

#[async_trait::async_trait]
impl MigrationTrait for SystemUsersMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SystemUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemUsers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SystemUsers::UserId).uuid().not_null())
                    .col(ColumnDef::new(SystemUsers::Name).string().not_null())
                    .col(ColumnDef::new(SystemUsers::ApplicationName).string().not_null())
                    .col(ColumnDef::new(SystemUsers::SyntheticEmail).string().not_null())
                    .col(ColumnDef::new(SystemUsers::ServiceType).string().not_null())
                    .col(ColumnDef::new(SystemUsers::Description).string())
                    .col(ColumnDef::new(SystemUsers::IsPrimary).boolean().not_null())
                    .col(ColumnDef::new(SystemUsers::IsActive).boolean().not_null())
                    .col(ColumnDef::new(SystemUsers::ExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(SystemUsers::Metadata).json().not_null())
                    .col(ColumnDef::new(SystemUsers::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(SystemUsers::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(SystemUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemUsers::UpdatedAt)
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
                    .name("idx_system_users_synthetic_email")
                    .table(SystemUsers::Table)
                    .col(SystemUsers::SyntheticEmail)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_system_users_name")
                    .table(SystemUsers::Table)
                    .col(SystemUsers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_system_users_application")
                    .table(SystemUsers::Table)
                    .col(SystemUsers::ApplicationName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SystemUsers {
    Table,
    Id,
    UserId,
    Name,
    ApplicationName,
    SyntheticEmail,
    ServiceType,
    Description,
    IsPrimary,
    IsActive,
    ExpiresAt,
    Metadata,
    CreatedBy,
    LastUsedAt,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct RbacMigration;

#[async_trait::async_trait]
impl MigrationTrait for RbacMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .col(ColumnDef::new(Roles::RoleType).string_len(16).not_null())
                    .col(ColumnDef::new(Roles::TenantId).uuid())
                    .col(ColumnDef::new(Roles::IsSystem).boolean().not_null())
                    .col(ColumnDef::new(Roles::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Roles::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_roles_name")
                    .table(Roles::Table)
                    .col(Roles::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Policies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Policies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Policies::Name).string().not_null())
                    .col(ColumnDef::new(Policies::TenantId).uuid())
                    .col(ColumnDef::new(Policies::IsSystem).boolean().not_null())
                    .col(ColumnDef::new(Policies::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Policies::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_policies_name")
                    .table(Policies::Table)
                    .col(Policies::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Permissions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Permissions::Service).string().not_null())
                    .col(ColumnDef::new(Permissions::Entity).string().not_null())
                    .col(ColumnDef::new(Permissions::Action).string().not_null())
                    .col(ColumnDef::new(Permissions::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_permissions_triple")
                    .table(Permissions::Table)
                    .col(Permissions::Service)
                    .col(Permissions::Entity)
                    .col(Permissions::Action)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RolePolicies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RolePolicies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RolePolicies::RoleId).uuid().not_null())
                    .col(ColumnDef::new(RolePolicies::PolicyId).uuid().not_null())
                    .col(ColumnDef::new(RolePolicies::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_policies_pair")
                    .table(RolePolicies::Table)
                    .col(RolePolicies::RoleId)
                    .col(RolePolicies::PolicyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PolicyPermissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PolicyPermissions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PolicyPermissions::PolicyId).uuid().not_null())
                    .col(ColumnDef::new(PolicyPermissions::PermissionId).uuid().not_null())
                    .col(
                        ColumnDef::new(PolicyPermissions::CreatedAt)
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
                    .name("idx_policy_permissions_pair")
                    .table(PolicyPermissions::Table)
                    .col(PolicyPermissions::PolicyId)
                    .col(PolicyPermissions::PermissionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlatformAdmins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlatformAdmins::UserId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlatformAdmins::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(PlatformAdmins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlatformAdmins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PolicyPermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RolePolicies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Policies::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Roles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    RoleType,
    TenantId,
    IsSystem,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Policies {
    Table,
    Id,
    Name,
    TenantId,
    IsSystem,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Service,
    Entity,
    Action,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RolePolicies {
    Table,
    Id,
    RoleId,
    PolicyId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PolicyPermissions {
    Table,
    Id,
    PolicyId,
    PermissionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlatformAdmins {
    Table,
    UserId,
    CreatedBy,
    CreatedAt,
}

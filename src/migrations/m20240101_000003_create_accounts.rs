//! Migration: Create accounts table

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::FullName).string().null())
                    .col(ColumnDef::new(Accounts::UtmSource).string().null())
                    .col(ColumnDef::new(Accounts::OrganizationId).big_integer().null())
                    .col(ColumnDef::new(Accounts::OrganizationRole).string().null())
                    .col(ColumnDef::new(Accounts::OrganizationUserId).string().null())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Accounts::Table, Accounts::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_organization")
                    .table(Accounts::Table)
                    .col(Accounts::OrganizationId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "accounts"]
pub enum Accounts {
    Table,
    Id,
    Email,
    #[iden = "full_name"]
    FullName,
    #[iden = "utm_source"]
    UtmSource,
    #[iden = "organization_id"]
    OrganizationId,
    #[iden = "organization_role"]
    OrganizationRole,
    #[iden = "organization_user_id"]
    OrganizationUserId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

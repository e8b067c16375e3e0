//! Migration: Create pipelines table
//!
//! A pipeline links an external CRM tenant to a local organization and the
//! OAuth credential currently in use for it.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_oauth_data::OauthData;
use super::m20240101_000002_create_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pipelines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pipelines::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pipelines::ExternalOrgId).string().null())
                    .col(
                        ColumnDef::new(Pipelines::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pipelines::DestinationId).integer().not_null())
                    .col(ColumnDef::new(Pipelines::OauthDataId).big_integer().null())
                    .col(
                        ColumnDef::new(Pipelines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pipelines::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pipelines::Table, Pipelines::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pipelines::Table, Pipelines::OauthDataId)
                            .to(OauthData::Table, OauthData::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pipelines_external_org_destination")
                    .table(Pipelines::Table)
                    .col(Pipelines::ExternalOrgId)
                    .col(Pipelines::DestinationId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pipelines_organization")
                    .table(Pipelines::Table)
                    .col(Pipelines::OrganizationId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pipelines::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "pipelines"]
enum Pipelines {
    Table,
    Id,
    #[iden = "external_org_id"]
    ExternalOrgId,
    #[iden = "organization_id"]
    OrganizationId,
    #[iden = "destination_id"]
    DestinationId,
    #[iden = "oauth_data_id"]
    OauthDataId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

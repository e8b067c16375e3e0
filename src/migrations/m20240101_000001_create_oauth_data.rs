//! Migration: Create oauth_data table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OauthData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OauthData::TokenType).string().not_null())
                    .col(ColumnDef::new(OauthData::AccessToken).text().null())
                    .col(ColumnDef::new(OauthData::RefreshToken).string().null())
                    .col(
                        ColumnDef::new(OauthData::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OauthData::RefreshedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OauthData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OauthData::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "oauth_data"]
pub enum OauthData {
    Table,
    Id,
    #[iden = "token_type"]
    TokenType,
    #[iden = "access_token"]
    AccessToken,
    #[iden = "refresh_token"]
    RefreshToken,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "refreshed_at"]
    RefreshedAt,
    #[iden = "created_at"]
    CreatedAt,
}

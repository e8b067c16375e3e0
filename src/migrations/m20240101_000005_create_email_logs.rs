//! Migration: Create email_logs table

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailLogs::AccountId).big_integer().null())
                    .col(
                        ColumnDef::new(EmailLogs::IdempotencyId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EmailLogs::Recipient).string().not_null())
                    .col(ColumnDef::new(EmailLogs::Subject).string().not_null())
                    .col(ColumnDef::new(EmailLogs::BodyHtml).text().not_null())
                    .col(
                        ColumnDef::new(EmailLogs::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EmailLogs::Table, EmailLogs::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailLogs::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "email_logs"]
enum EmailLogs {
    Table,
    Id,
    #[iden = "account_id"]
    AccountId,
    #[iden = "idempotency_id"]
    IdempotencyId,
    Recipient,
    Subject,
    #[iden = "body_html"]
    BodyHtml,
    #[iden = "sent_at"]
    SentAt,
}

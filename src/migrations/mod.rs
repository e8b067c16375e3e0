pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_oauth_data;
mod m20240101_000002_create_organizations;
mod m20240101_000003_create_accounts;
mod m20240101_000004_create_pipelines;
mod m20240101_000005_create_email_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_oauth_data::Migration),
            Box::new(m20240101_000002_create_organizations::Migration),
            Box::new(m20240101_000003_create_accounts::Migration),
            Box::new(m20240101_000004_create_pipelines::Migration),
            Box::new(m20240101_000005_create_email_logs::Migration),
        ]
    }
}

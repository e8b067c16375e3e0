use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ORGANIZATION_ROLE_OWNER: &str = "owner";
pub const ORGANIZATION_ROLE_CONTRIBUTOR: &str = "contributor";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    pub utm_source: Option<String>,
    pub organization_id: Option<i64>,
    /// Set once; an existing "owner" is never downgraded.
    pub organization_role: Option<String>,
    /// The user id of this account inside the external CRM (HubSpot owner id).
    pub organization_user_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::email_log::Entity")]
    EmailLogs,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::email_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links an external CRM tenant to an organization and its current credential.
///
/// Unique on `(external_org_id, destination_id)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pipelines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub external_org_id: Option<String>,
    pub organization_id: i64,
    pub destination_id: i32,
    pub oauth_data_id: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::oauth_data::Entity",
        from = "Column::OauthDataId",
        to = "super::oauth_data::Column::Id"
    )]
    OauthData,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::oauth_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OauthData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

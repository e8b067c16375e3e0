use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Token type of rows created through the OAuth authorization-code grant
pub const OAUTH_DATA_TOKEN_TYPE_OAUTH: &str = "oauth";

/// One row per OAuth grant. Several rows may carry the same refresh token.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub token_type: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub refreshed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pipeline::Entity")]
    Pipelines,
}

impl Related<super::pipeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pipelines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

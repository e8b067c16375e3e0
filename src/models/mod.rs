pub mod account;
pub mod email_log;
pub mod oauth_data;
pub mod organization;
pub mod pipeline;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::account::{self, Entity as Account};
    pub use super::email_log::{self, Entity as EmailLog};
    pub use super::oauth_data::{self, Entity as OauthData};
    pub use super::organization::{self, Entity as Organization};
    pub use super::pipeline::{self, Entity as Pipeline};
}

/// Destination id of HubSpot pipelines
pub const DESTINATION_HUBSPOT_ID: i32 = 1;

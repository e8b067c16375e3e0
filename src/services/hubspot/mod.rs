//! HubSpot CRM gateway: transport, credential lifecycle and object calls.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod token;
pub mod types;

pub use api::{
    AccessTokenInfo, CrmObject, HubspotApi, Owner, Properties, PropertyDefinition,
    PropertyOption, TokenGrant, VendorError,
};
pub use client::{filter_properties, HubspotClient};
pub use error::{parse_existing_id, CrmError};
pub use self::http::HttpHubspotApi;
pub use response::ApiResponse;
pub use token::{ensure_fresh, insert_grant, update_safely, CredentialHandle};
pub use types::{is_allowed_field, AssociationType, FieldName, ObjectType};

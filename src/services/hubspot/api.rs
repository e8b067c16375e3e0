//! Transport seam for the HubSpot REST API.
//!
//! `HubspotApi` knows nothing about credentials storage or the database; it
//! takes bearer tokens as arguments and reports non-2xx responses as
//! [`VendorError`]. See `http.rs` for the reqwest implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{AssociationType, ObjectType};

/// Object properties as sent to and returned by HubSpot
pub type Properties = Map<String, Value>;

// ============================================================================
// Response types
// ============================================================================

/// Result of the OAuth token endpoint (authorization code or refresh grant)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Metadata about an access token. The token itself is not kept.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessTokenInfo {
    pub hub_id: i64,
    #[serde(default)]
    pub hub_domain: Option<String>,
    /// Email of the user who granted access
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub app_id: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// A HubSpot user who can own CRM records
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Owner {
    /// "First Last", skipping missing parts
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// A created CRM object (contact, call, task)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrmObject {
    pub id: String,
    #[serde(default)]
    pub properties: Properties,
}

/// An option of an enumeration property
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropertyOption {
    pub label: String,
    pub value: String,
}

/// One entry of the properties API listing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<PropertyOption>,
    #[serde(default)]
    pub hidden: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// A failed HubSpot call: HTTP status and raw response body.
///
/// Transport failures (connect, timeout) carry status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    pub status: u16,
    pub body: String,
}

impl VendorError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The `message` field of a JSON error body, or the raw body
    pub fn message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| self.body.clone())
    }
}

impl std::fmt::Display for VendorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message())
    }
}

impl std::error::Error for VendorError {}

// ============================================================================
// Trait
// ============================================================================

#[async_trait]
pub trait HubspotApi: Send + Sync {
    /// Trade a one-time authorization code for tokens
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, VendorError>;

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, VendorError>;

    async fn access_token_info(&self, access_token: &str) -> Result<AccessTokenInfo, VendorError>;

    /// All owners, following pagination
    async fn list_owners(&self, access_token: &str) -> Result<Vec<Owner>, VendorError>;

    async fn create_object(
        &self,
        access_token: &str,
        object_type: ObjectType,
        properties: &Properties,
    ) -> Result<CrmObject, VendorError>;

    async fn create_association(
        &self,
        access_token: &str,
        from_type: ObjectType,
        from_id: &str,
        to_type: ObjectType,
        to_id: &str,
        association: AssociationType,
    ) -> Result<Value, VendorError>;

    async fn list_properties(
        &self,
        access_token: &str,
        object_type: ObjectType,
    ) -> Result<Vec<PropertyDefinition>, VendorError>;
}

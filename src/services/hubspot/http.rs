//! reqwest implementation of [`HubspotApi`]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::hubspot::HubspotConfig;

use super::api::{
    AccessTokenInfo, CrmObject, HubspotApi, Owner, Properties, PropertyDefinition, TokenGrant,
    VendorError,
};
use super::types::{AssociationType, ObjectType};

const OWNERS_PAGE_LIMIT: &str = "100";

// Shared reqwest client for HubSpot API requests
#[allow(clippy::expect_used)]
static HUBSPOT_HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build HubSpot HTTP client")
});

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Deserialize)]
struct Paged<T> {
    results: Vec<T>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Deserialize)]
struct NextPage {
    after: String,
}

// ============================================================================
// Client
// ============================================================================

/// Talks to `api.hubapi.com` (or `api_base_url` from config)
#[derive(Clone)]
pub struct HttpHubspotApi {
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl HttpHubspotApi {
    pub fn new(config: &HubspotConfig) -> Self {
        if uuid::Uuid::parse_str(&config.client_secret).is_err() {
            tracing::warn!("HUBSPOT_CLIENT_SECRET is expected to be a UUID");
        }
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, VendorError> {
        let resp = HUBSPOT_HTTP_CLIENT
            .post(self.url("/oauth/v1/token"))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(resp).await
    }
}

#[async_trait]
impl HubspotApi for HttpHubspotApi {
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, VendorError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("code", code),
        ])
        .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, VendorError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn access_token_info(&self, access_token: &str) -> Result<AccessTokenInfo, VendorError> {
        let resp = HUBSPOT_HTTP_CLIENT
            .get(self.url(&format!(
                "/oauth/v1/access-tokens/{}",
                urlencoding::encode(access_token)
            )))
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(resp).await
    }

    async fn list_owners(&self, access_token: &str) -> Result<Vec<Owner>, VendorError> {
        let mut owners = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", OWNERS_PAGE_LIMIT.to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let resp = HUBSPOT_HTTP_CLIENT
                .get(self.url("/crm/v3/owners"))
                .bearer_auth(access_token)
                .query(&query)
                .send()
                .await
                .map_err(transport_error)?;
            let page: Paged<Owner> = parse_json(resp).await?;

            owners.extend(page.results);
            after = page.paging.and_then(|p| p.next).map(|n| n.after);
            if after.is_none() {
                break;
            }
        }

        Ok(owners)
    }

    async fn create_object(
        &self,
        access_token: &str,
        object_type: ObjectType,
        properties: &Properties,
    ) -> Result<CrmObject, VendorError> {
        let resp = HUBSPOT_HTTP_CLIENT
            .post(self.url(&format!("/crm/v3/objects/{}", object_type.api_name())))
            .bearer_auth(access_token)
            .json(&json!({ "properties": properties }))
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(resp).await
    }

    async fn create_association(
        &self,
        access_token: &str,
        from_type: ObjectType,
        from_id: &str,
        to_type: ObjectType,
        to_id: &str,
        association: AssociationType,
    ) -> Result<Value, VendorError> {
        let resp = HUBSPOT_HTTP_CLIENT
            .put(self.url(&format!(
                "/crm/v4/objects/{}/{}/associations/{}/{}",
                from_type.api_name(),
                urlencoding::encode(from_id),
                to_type.api_name(),
                urlencoding::encode(to_id)
            )))
            .bearer_auth(access_token)
            .json(&json!([{
                "associationCategory": "HUBSPOT_DEFINED",
                "associationTypeId": association.id(),
            }]))
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(resp).await
    }

    async fn list_properties(
        &self,
        access_token: &str,
        object_type: ObjectType,
    ) -> Result<Vec<PropertyDefinition>, VendorError> {
        let resp = HUBSPOT_HTTP_CLIENT
            .get(self.url(&format!(
                "/crm/v3/properties/{}",
                object_type.api_name()
            )))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;
        let page: Paged<PropertyDefinition> = parse_json(resp).await?;
        Ok(page.results)
    }
}

fn transport_error(e: reqwest::Error) -> VendorError {
    VendorError::new(e.status().map(|s| s.as_u16()).unwrap_or(0), e.to_string())
}

/// Turn a response into `T`, or a [`VendorError`] for non-2xx statuses
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, VendorError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(VendorError::new(status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|e| {
        VendorError::new(
            status.as_u16(),
            format!("Failed to parse HubSpot response: {}", e),
        )
    })
}

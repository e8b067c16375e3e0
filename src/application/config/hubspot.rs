use std::env;

/// HubSpot public app credentials and endpoints.
///
/// The client secret is only ever read from the environment.
#[derive(Clone)]
pub struct HubspotConfig {
    pub app_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URL registered with the HubSpot app,
    /// see `endpoints::hubspot::oauth_redirect`.
    pub redirect_url: String,
    pub api_base_url: String,
    /// Where the user lands after the OAuth callback finished.
    pub app_base_url: String,
}

impl HubspotConfig {
    pub fn from_env() -> Self {
        Self {
            app_id: env::var("HUBSPOT_APP_ID").unwrap_or_else(|_| "2150554".to_string()),
            client_id: env::var("HUBSPOT_CLIENT_ID")
                .unwrap_or_else(|_| "501ffe58-5d49-47ff-b41f-627fccc28715".to_string()),
            client_secret: env::var("HUBSPOT_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: env::var("HUBSPOT_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:8000/hubspot/oauth/redirect".to_string()),
            api_base_url: env::var("HUBSPOT_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.hubapi.com".to_string()),
            app_base_url: env::var("HUBSYNC_APP_BASE_URL")
                .unwrap_or_else(|_| "https://app.dumpsheet.com".to_string()),
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for HubspotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubspotConfig")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .field("redirect_url", &self.redirect_url)
            .field("api_base_url", &self.api_base_url)
            .field("app_base_url", &self.app_base_url)
            .finish()
    }
}

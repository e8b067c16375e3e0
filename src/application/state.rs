use std::sync::Arc;

use crate::db::DbConn;
use crate::services::hubspot::HubspotApi;

/// Shared HubSpot transport
pub type SharedHubspotApi = Arc<dyn HubspotApi>;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub hubspot: SharedHubspotApi,
    /// Landing page the OAuth callback redirects to
    pub app_base_url: String,
}

impl AppState {
    pub fn new(db: DbConn, hubspot: SharedHubspotApi, app_base_url: impl Into<String>) -> Self {
        Self {
            db,
            hubspot,
            app_base_url: app_base_url.into(),
        }
    }
}

pub mod hubspot;

use axum::Router;

use crate::config::CONFIG;
use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .route("/api/system/version", axum::routing::get(get_version))
        .nest("/hubspot", hubspot::hubspot_routes(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
    }))
}

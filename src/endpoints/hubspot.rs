use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::reconciler::{handle_oauth_redirect, status_redirect_url};
use crate::state::AppState;

/// HubSpot app routes, nested under `/hubspot`
pub fn hubspot_routes(state: AppState) -> Router {
    Router::new()
        .route("/oauth/redirect", get(oauth_redirect))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct OAuthRedirectQuery {
    pub code: Option<String>,
    /// Account id of the user who started the install, if known
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OAuth redirect target registered with the HubSpot app
async fn oauth_redirect(
    State(state): State<AppState>,
    Query(query): Query<OAuthRedirectQuery>,
) -> Result<Response> {
    if let Some(error) = &query.error {
        tracing::warn!(
            "HubSpot OAuth error: {} ({})",
            error,
            query.error_description.as_deref().unwrap_or("no description")
        );
        let url = status_redirect_url(&state.app_base_url, "error", None);
        return Ok(Redirect::to(&url).into_response());
    }

    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let outcome = handle_oauth_redirect(
        &state.db,
        state.hubspot.clone(),
        code,
        query.state.as_deref(),
        &state.app_base_url,
    )
    .await?;

    if !outcome.warnings.is_empty() {
        tracing::info!(
            "HubSpot OAuth for pipeline {} finished with {} warnings",
            outcome.pipeline_id,
            outcome.warnings.len()
        );
    }

    Ok(Redirect::to(&outcome.redirect_url).into_response())
}

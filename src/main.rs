use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hubsync::config::CONFIG;
use hubsync::db;
use hubsync::endpoints::create_router;
use hubsync::services::HttpHubspotApi;
use hubsync::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before CONFIG is first read
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!(
        "Starting hubsync v{} ({})",
        CONFIG.version,
        CONFIG.commit_hash
    );
    tracing::debug!("HubSpot config: {:?}", CONFIG.hubspot);
    if CONFIG.email.is_enabled() {
        tracing::info!("SMTP configured at {:?}", CONFIG.email.smtp_host);
    } else {
        tracing::info!("HUBSYNC_SMTP_HOST not set");
    }

    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    let hubspot = Arc::new(HttpHubspotApi::new(&CONFIG.hubspot));
    let state = AppState::new(conn, hubspot, CONFIG.hubspot.app_base_url.clone());

    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hubsync={level},tower_http={level}",
            level = CONFIG.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if CONFIG.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the main application router
fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = CONFIG
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

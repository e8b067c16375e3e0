pub mod database;
pub mod email;
pub mod hubspot;
pub mod server;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub hubspot: hubspot::HubspotConfig,
    pub email: email::EmailConfig,

    // Build info
    pub commit_hash: String,
    pub version: String,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            hubspot: hubspot::HubspotConfig::from_env(),
            email: email::EmailConfig::from_env(),

            // Build info
            commit_hash: env::var("COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("HUBSYNC_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            log_format: env::var("HUBSYNC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

use std::env;

/// SMTP settings for the summary emails. Sending is disabled when
/// `HUBSYNC_SMTP_HOST` is not set.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("HUBSYNC_SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: env::var("HUBSYNC_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("HUBSYNC_SMTP_USERNAME").unwrap_or_default(),
            password: env::var("HUBSYNC_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("HUBSYNC_EMAIL_FROM")
                .unwrap_or_else(|_| "assistant@dumpsheet.com".to_string()),
            from_name: env::var("HUBSYNC_EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Dumpsheet Assistant".to_string()),
            use_tls: env::var("HUBSYNC_SMTP_TLS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp_host.is_some()
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::api::VendorError;

#[allow(clippy::expect_used)]
static EXISTING_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Existing ID:\s*(\d+)").expect("valid existing id regex"));

/// Failures of the HubSpot integration
#[derive(Debug, Error)]
pub enum CrmError {
    /// Token exchange or refresh failed; the current operation cannot proceed
    #[error("HubSpot authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// A CRM call was rejected
    #[error("HubSpot {endpoint} failed (HTTP {status}): {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
        /// Id of the conflicting object when HubSpot reported a duplicate
        hs_object_id: Option<String>,
    },

    #[error("Credential store error: {0}")]
    Store(String),
}

impl CrmError {
    pub fn auth(err: &VendorError) -> Self {
        CrmError::Auth {
            status: err.status,
            message: err.message(),
        }
    }

    /// Normalize a vendor error, recovering the existing object id on 409
    pub fn api(endpoint: impl Into<String>, err: &VendorError) -> Self {
        let message = err.message();
        let hs_object_id = if err.status == 409 {
            parse_existing_id(&message)
        } else {
            None
        };
        CrmError::Api {
            endpoint: endpoint.into(),
            status: err.status,
            message,
            hs_object_id,
        }
    }

    /// HTTP status reported by HubSpot, 500 for local failures
    pub fn status(&self) -> u16 {
        match self {
            CrmError::Auth { status, .. } | CrmError::Api { status, .. } => *status,
            CrmError::Store(_) => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CrmError::Auth { message, .. } | CrmError::Api { message, .. } => message.clone(),
            CrmError::Store(message) => message.clone(),
        }
    }

    pub fn hs_object_id(&self) -> Option<&str> {
        match self {
            CrmError::Api { hs_object_id, .. } => hs_object_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CrmError::Api { status: 409, .. })
    }
}

impl From<sea_orm::DbErr> for CrmError {
    fn from(err: sea_orm::DbErr) -> Self {
        CrmError::Store(err.to_string())
    }
}

/// Extract the id from messages like `Contact already exists. Existing ID: 12345`
pub fn parse_existing_id(message: &str) -> Option<String> {
    EXISTING_ID_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_existing_id() {
        assert_eq!(
            parse_existing_id("Contact already exists. Existing ID: 12345").as_deref(),
            Some("12345")
        );
        assert_eq!(
            parse_existing_id("Existing ID:987").as_deref(),
            Some("987")
        );
        assert_eq!(parse_existing_id("Property values were not valid"), None);
    }

    #[test]
    fn test_conflict_carries_existing_id() {
        let vendor = VendorError::new(
            409,
            r#"{"status":"error","message":"Contact already exists. Existing ID: 12345"}"#,
        );
        let err = CrmError::api("contact create", &vendor);

        assert!(err.is_conflict());
        assert_eq!(err.status(), 409);
        assert_eq!(err.hs_object_id(), Some("12345"));
    }

    #[test]
    fn test_existing_id_only_parsed_for_conflicts() {
        let vendor = VendorError::new(400, "Existing ID: 12345");
        let err = CrmError::api("contact create", &vendor);

        assert_eq!(err.hs_object_id(), None);
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_auth_error_display() {
        let vendor = VendorError::new(
            400,
            r#"{"status":"BAD_REFRESH_TOKEN","message":"missing or unknown refresh token"}"#,
        );
        let err = CrmError::auth(&vendor);
        assert_eq!(
            err.to_string(),
            "HubSpot authentication failed (HTTP 400): missing or unknown refresh token"
        );
    }

    #[test]
    fn test_store_error_from_db_err() {
        let err: CrmError = sea_orm::DbErr::RecordNotFound("oauth_data 7".to_string()).into();
        assert_eq!(err.status(), 500);
        assert!(err.message().contains("oauth_data 7"));
    }
}

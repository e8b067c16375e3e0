//! OAuth credential lifecycle: storing grants and keeping access tokens fresh.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::models::oauth_data;
use crate::models::prelude::*;

use super::api::HubspotApi;
use super::error::CrmError;

/// Seconds cut from `expires_in` when a token is refreshed
const REFRESH_EXPIRY_MARGIN_SECS: i64 = 300;
/// Seconds cut from `expires_in` when a grant is stored
const GRANT_EXPIRY_MARGIN_SECS: i64 = 60;

/// In-memory cache of one credential row, owned by a single client.
#[derive(Debug, Clone)]
pub struct CredentialHandle {
    pub oauth_data_id: i64,
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl CredentialHandle {
    pub fn new(oauth_data_id: i64) -> Self {
        Self {
            oauth_data_id,
            access_token: None,
            expires_at: None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (self.expires_at, &self.access_token) {
            (Some(expires_at), Some(_)) => now >= expires_at,
            _ => true,
        }
    }
}

/// Insert an empty credential row for a new grant
pub async fn insert_grant(
    db: &DatabaseConnection,
    token_type: &str,
) -> Result<oauth_data::Model, DbErr> {
    let row = oauth_data::ActiveModel {
        token_type: Set(token_type.to_string()),
        access_token: Set(None),
        refresh_token: Set(None),
        expires_at: Set(None),
        refreshed_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let row = row.insert(db).await?;
    tracing::debug!("Inserted oauth_data {} ({})", row.id, token_type);
    Ok(row)
}

/// Store tokens on an existing row.
///
/// A zero or missing `expires_in` clears `expires_at`, forcing a refresh on
/// next use. A missing refresh token is stored as `NULL`.
pub async fn update_safely(
    db: &DatabaseConnection,
    oauth_data_id: i64,
    refresh_token: Option<&str>,
    access_token: Option<&str>,
    expires_in: Option<i64>,
) -> Result<oauth_data::Model, DbErr> {
    let refresh_token = refresh_token.filter(|t| !t.is_empty());
    match refresh_token.map(uuid::Uuid::parse_str) {
        None => tracing::warn!("No refresh token for oauth_data {}", oauth_data_id),
        // HubSpot refresh tokens are UUIDs
        Some(Err(e)) => tracing::warn!(
            "Expected refresh token of oauth_data {} to be a UUID: {}",
            oauth_data_id,
            e
        ),
        Some(Ok(_)) => {}
    }

    let now = Utc::now();
    let expires_at = expires_in.filter(|secs| *secs != 0).and_then(|secs| {
        let expires_at = expiry_after(now, secs, GRANT_EXPIRY_MARGIN_SECS);
        if expires_at.is_none() {
            tracing::warn!(
                "Ignoring out of range expires_in {} for oauth_data {}",
                secs,
                oauth_data_id
            );
        }
        expires_at
    });

    let existing = OauthData::find_by_id(oauth_data_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("oauth_data {}", oauth_data_id)))?;

    let mut model: oauth_data::ActiveModel = existing.into();
    model.refresh_token = Set(refresh_token.map(String::from));
    model.access_token = Set(access_token.map(String::from));
    model.refreshed_at = Set(Some(now));
    model.expires_at = Set(expires_at);
    let updated = model.update(db).await?;

    tracing::info!(
        "Updated oauth_data {}, good until {:?}",
        oauth_data_id,
        expires_at
    );
    Ok(updated)
}

/// Make sure `handle` holds a live access token and return it.
///
/// Refreshes through HubSpot when the cached expiry is unset or past. The
/// new expiry is shortened by five minutes.
pub async fn ensure_fresh(
    db: &DatabaseConnection,
    api: &dyn HubspotApi,
    handle: &mut CredentialHandle,
) -> Result<String, CrmError> {
    if handle.expires_at.is_none() {
        let row = load_row(db, handle.oauth_data_id).await?;
        if row.expires_at.is_some() {
            handle.expires_at = row.expires_at;
            handle.access_token = row.access_token;
            tracing::debug!(
                "Reusing stored access token valid until {:?}",
                handle.expires_at
            );
        }
    }

    let now = Utc::now();
    if handle.needs_refresh(now) {
        tracing::info!(
            "Refreshing token for oauth_data {}, expires at {:?} and now is {}",
            handle.oauth_data_id,
            handle.expires_at,
            now
        );
        refresh(db, api, handle, now).await?;
    }

    handle.access_token.clone().ok_or_else(|| CrmError::Auth {
        status: 401,
        message: format!("No access token for oauth_data {}", handle.oauth_data_id),
    })
}

async fn refresh(
    db: &DatabaseConnection,
    api: &dyn HubspotApi,
    handle: &mut CredentialHandle,
    now: DateTime<Utc>,
) -> Result<(), CrmError> {
    let row = load_row(db, handle.oauth_data_id).await?;
    let current_refresh_token = row.refresh_token.clone().ok_or_else(|| CrmError::Auth {
        status: 401,
        message: format!("No refresh token for oauth_data {}", handle.oauth_data_id),
    })?;

    let grant = api
        .refresh_access_token(&current_refresh_token)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to refresh access token for oauth_data {}: {}",
                handle.oauth_data_id,
                e
            );
            CrmError::auth(&e)
        })?;

    let expires_at = expiry_after(now, grant.expires_in, REFRESH_EXPIRY_MARGIN_SECS)
        .ok_or_else(|| CrmError::Auth {
            status: 502,
            message: format!(
                "Refresh for oauth_data {} returned out of range expires_in {}",
                handle.oauth_data_id, grant.expires_in
            ),
        })?;

    let mut model: oauth_data::ActiveModel = row.into();
    model.access_token = Set(Some(grant.access_token.clone()));
    model.expires_at = Set(Some(expires_at));
    model.refreshed_at = Set(Some(now));
    if let Some(rotated) = grant
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty() && *t != current_refresh_token)
    {
        tracing::info!(
            "Refresh token rotated for oauth_data {}, valid until {}",
            handle.oauth_data_id,
            expires_at
        );
        model.refresh_token = Set(Some(rotated.to_string()));
    }
    model.update(db).await?;

    handle.access_token = Some(grant.access_token);
    handle.expires_at = Some(expires_at);
    tracing::debug!("Token refreshed, expires at {}", expires_at);
    Ok(())
}

/// `now + expires_in - margin`, `None` when the result is not representable
fn expiry_after(now: DateTime<Utc>, expires_in: i64, margin_secs: i64) -> Option<DateTime<Utc>> {
    let secs = expires_in.checked_sub(margin_secs)?;
    now.checked_add_signed(Duration::try_seconds(secs)?)
}

async fn load_row(db: &DatabaseConnection, id: i64) -> Result<oauth_data::Model, CrmError> {
    OauthData::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CrmError::Store(format!("oauth_data {} not found", id)))
}

//! Links a HubSpot portal to our accounts, organization and pipeline when a
//! user completes the OAuth flow.
//!
//! Several signals are used to stay idempotent across repeated installs:
//! the account id carried in the OAuth `state`, the HubSpot hub id (stored as
//! `external_org_id` on the pipeline) and the owners' email addresses.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::models::prelude::*;
use crate::models::{
    account, oauth_data, organization, pipeline, DESTINATION_HUBSPOT_ID,
};
use crate::services::hubspot::{
    insert_grant, update_safely, CrmError, HubspotApi, HubspotClient, Owner,
};

/// utm_source of accounts created from HubSpot owners
pub const HUBSPOT_UTM_SOURCE: &str = "hubspot_app";

// ============================================================================
// Outcome types
// ============================================================================

/// Non-fatal findings while linking. Logged and returned, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationWarning {
    OwnersUnavailable {
        reason: String,
    },
    OwnerWithoutEmail {
        owner_id: String,
    },
    InvalidState {
        state: String,
    },
    AdminAccountNotFound {
        account_id: i64,
    },
    /// The owners' accounts already belong to different organizations
    AmbiguousOrganizations {
        organization_ids: Vec<i64>,
    },
    /// The pipeline used a credential with another refresh token
    RefreshTokenMismatch {
        pipeline_id: i64,
        previous_oauth_data_id: i64,
        new_oauth_data_id: i64,
    },
    AccountInOtherOrganization {
        account_id: i64,
        organization_id: i64,
        chosen_organization_id: i64,
    },
}

impl std::fmt::Display for ReconciliationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconciliationWarning::OwnersUnavailable { reason } => {
                write!(f, "Could not list HubSpot owners: {}", reason)
            }
            ReconciliationWarning::OwnerWithoutEmail { owner_id } => {
                write!(f, "HubSpot owner {} has no email", owner_id)
            }
            ReconciliationWarning::InvalidState { state } => {
                write!(f, "OAuth state {:?} is not an account id", state)
            }
            ReconciliationWarning::AdminAccountNotFound { account_id } => {
                write!(f, "Admin account {} from OAuth state does not exist", account_id)
            }
            ReconciliationWarning::AmbiguousOrganizations { organization_ids } => write!(
                f,
                "Potential trouble linking HubSpot organization, accounts have multiple organizations {:?}",
                organization_ids
            ),
            ReconciliationWarning::RefreshTokenMismatch {
                pipeline_id,
                previous_oauth_data_id,
                new_oauth_data_id,
            } => write!(
                f,
                "Different refresh token given through OAuth than in use for pipeline {}, \
                 new oauth_data {} and old {}",
                pipeline_id, new_oauth_data_id, previous_oauth_data_id
            ),
            ReconciliationWarning::AccountInOtherOrganization {
                account_id,
                organization_id,
                chosen_organization_id,
            } => write!(
                f,
                "Account {} is part of organization {} instead of {}",
                account_id, organization_id, chosen_organization_id
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub redirect_url: String,
    pub oauth_data_id: i64,
    pub external_org_id: String,
    pub organization_id: i64,
    pub pipeline_id: i64,
    pub admin_account_id: Option<i64>,
    /// Accounts derived from the HubSpot owners
    pub account_ids: Vec<i64>,
    pub warnings: Vec<ReconciliationWarning>,
}

#[derive(Default)]
struct Warnings(Vec<ReconciliationWarning>);

impl Warnings {
    fn push(&mut self, warning: ReconciliationWarning) {
        tracing::warn!("{}", warning);
        self.0.push(warning);
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Handle the OAuth callback: store the grant, then reconcile.
pub async fn handle_oauth_redirect(
    db: &DatabaseConnection,
    api: Arc<dyn HubspotApi>,
    code: &str,
    state: Option<&str>,
    app_base_url: &str,
) -> Result<ReconcileOutcome, CrmError> {
    tracing::info!("HubSpot OAuth redirect received");

    // One-time code, there is no retrying this.
    let grant = api.exchange_authorization_code(code).await.map_err(|e| {
        tracing::error!("Failed to exchange HubSpot authorization code: {}", e);
        CrmError::auth(&e)
    })?;

    // Each grant gets its own row, even when the refresh token repeats.
    let row = insert_grant(db, oauth_data::OAUTH_DATA_TOKEN_TYPE_OAUTH).await?;
    update_safely(
        db,
        row.id,
        grant.refresh_token.as_deref(),
        Some(&grant.access_token),
        Some(grant.expires_in),
    )
    .await?;

    let mut client = HubspotClient::new(db.clone(), api, row.id);
    reconcile(db, &mut client, state, app_base_url).await
}

/// Resolve or create the account, organization and pipeline for the portal
/// behind `client`'s credential.
pub async fn reconcile(
    db: &DatabaseConnection,
    client: &mut HubspotClient,
    state: Option<&str>,
    app_base_url: &str,
) -> Result<ReconcileOutcome, CrmError> {
    let oauth_data_id = client.oauth_data_id();
    let mut warnings = Warnings::default();

    // Owners become accounts
    let owners = match client.list_owners().await {
        Ok(owners) => owners,
        Err(e) => {
            warnings.push(ReconciliationWarning::OwnersUnavailable {
                reason: e.to_string(),
            });
            Vec::new()
        }
    };
    let accounts = get_or_onboard_for_hubspot(db, &owners, &mut warnings).await?;

    let mut unique_org_ids = BTreeSet::new();
    let mut without_org = 0;
    for acc in &accounts {
        match acc.organization_id {
            Some(org_id) => {
                unique_org_ids.insert(org_id);
            }
            None => without_org += 1,
        }
    }
    tracing::info!(
        "Fetched {} HubSpot owner accounts, {} without an organization",
        accounts.len(),
        without_org
    );
    match unique_org_ids.len() {
        0 => tracing::info!("None of the HubSpot accounts has an organization"),
        1 => tracing::info!("Found one organization among HubSpot accounts: {:?}", unique_org_ids),
        _ => warnings.push(ReconciliationWarning::AmbiguousOrganizations {
            organization_ids: unique_org_ids.iter().copied().collect(),
        }),
    }

    // The hub id identifies the portal
    let metadata = client.get_account_metadata().await?;
    let external_org_id = metadata.hub_id.to_string();
    let external_org_name = metadata.hub_domain.clone();
    let existing_pipeline =
        find_pipeline_for_external_org(db, &external_org_id, DESTINATION_HUBSPOT_ID).await?;

    // Admin from state, otherwise by the granting user's email
    let mut admin_account = None;
    if let Some(account_id) = parse_account_id_from_state(state, &mut warnings) {
        admin_account = Account::find_by_id(account_id).one(db).await?;
        if admin_account.is_none() {
            warnings.push(ReconciliationWarning::AdminAccountNotFound { account_id });
        }
    }
    if admin_account.is_none() {
        if let Some(email) = metadata.user.as_deref() {
            tracing::debug!("Looking up admin account by HubSpot user email");
            admin_account = find_account_by_email(db, email).await?;
        }
    }
    let admin_account_id = admin_account.as_ref().map(|a| a.id);

    // Decide on the organization
    let mut org = None;
    if let Some(org_id) = admin_account.as_ref().and_then(|a| a.organization_id) {
        org = Organization::find_by_id(org_id).one(db).await?;
        if org.is_some() {
            tracing::info!("Using organization {} of admin account", org_id);
        }
    }
    if org.is_none() {
        if let Some(existing) = &existing_pipeline {
            org = Organization::find_by_id(existing.organization_id).one(db).await?;
            if org.is_some() {
                tracing::info!(
                    "Using organization {} of existing pipeline {}",
                    existing.organization_id,
                    existing.id
                );
            }
        }
    }
    let org = match org {
        Some(org) => org,
        None => {
            tracing::info!("Creating a new organization");
            get_or_create_organization_for_account(
                db,
                admin_account.as_ref(),
                external_org_name.as_deref(),
            )
            .await?
        }
    };
    tracing::info!("Chosen organization {}", org.id);

    // Pipeline: always points at the newest grant
    let pipeline =
        get_or_create_pipeline(db, &external_org_id, org.id, DESTINATION_HUBSPOT_ID).await?;
    if let Some(previous_id) = pipeline.oauth_data_id.filter(|id| *id != oauth_data_id) {
        let previous = OauthData::find_by_id(previous_id).one(db).await?;
        let current = OauthData::find_by_id(oauth_data_id).one(db).await?;
        let previous_token = previous.and_then(|o| o.refresh_token);
        let current_token = current.and_then(|o| o.refresh_token);
        if previous_token != current_token {
            warnings.push(ReconciliationWarning::RefreshTokenMismatch {
                pipeline_id: pipeline.id,
                previous_oauth_data_id: previous_id,
                new_oauth_data_id: oauth_data_id,
            });
        }
    }
    let pipeline_id = pipeline.id;
    let backfill_external_id = pipeline.external_org_id.is_none();
    let mut active: pipeline::ActiveModel = pipeline.into();
    active.oauth_data_id = Set(Some(oauth_data_id));
    if backfill_external_id {
        tracing::info!("Setting pipeline {} external_org_id", pipeline_id);
        active.external_org_id = Set(Some(external_org_id.clone()));
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    tracing::info!("Pipeline {} now uses oauth_data {}", pipeline_id, oauth_data_id);

    // Organization name
    let organization_id = org.id;
    if org.name.is_none() {
        if let Some(name) = &external_org_name {
            tracing::info!("Setting organization {} name to {}", organization_id, name);
            let mut active: organization::ActiveModel = org.into();
            active.name = Set(Some(name.clone()));
            active.updated_at = Set(Utc::now());
            active.update(db).await?;
        }
    }

    // Link owner accounts, never overwriting an existing role
    let mut account_ids = Vec::with_capacity(accounts.len());
    for acc in &accounts {
        account_ids.push(acc.id);
        let Some(current) = Account::find_by_id(acc.id).one(db).await? else {
            continue;
        };
        link_account(db, current, organization_id, admin_account_id, &mut warnings).await?;
    }

    let redirect_url = status_redirect_url(app_base_url, "success", admin_account_id);
    Ok(ReconcileOutcome {
        redirect_url,
        oauth_data_id,
        external_org_id,
        organization_id,
        pipeline_id,
        admin_account_id,
        account_ids,
        warnings: warnings.0,
    })
}

/// `{base}?hubspot_status={status}&account_id={id}`, empty id when unknown
pub fn status_redirect_url(app_base_url: &str, status: &str, account_id: Option<i64>) -> String {
    let separator = if app_base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}hubspot_status={}&account_id={}",
        app_base_url,
        separator,
        urlencoding::encode(status),
        account_id.map(|id| id.to_string()).unwrap_or_default()
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_account_id_from_state(state: Option<&str>, warnings: &mut Warnings) -> Option<i64> {
    let state = state.map(str::trim).filter(|s| !s.is_empty())?;
    match state.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warnings.push(ReconciliationWarning::InvalidState {
                state: state.to_string(),
            });
            None
        }
    }
}

async fn link_account(
    db: &DatabaseConnection,
    acc: account::Model,
    organization_id: i64,
    admin_account_id: Option<i64>,
    warnings: &mut Warnings,
) -> Result<(), DbErr> {
    let set_org = match acc.organization_id {
        None => true,
        Some(existing) if existing != organization_id => {
            warnings.push(ReconciliationWarning::AccountInOtherOrganization {
                account_id: acc.id,
                organization_id: existing,
                chosen_organization_id: organization_id,
            });
            false
        }
        Some(_) => false,
    };
    let set_role = acc.organization_role.is_none();
    if !set_org && !set_role {
        return Ok(());
    }

    let role = if Some(acc.id) == admin_account_id {
        account::ORGANIZATION_ROLE_OWNER
    } else {
        account::ORGANIZATION_ROLE_CONTRIBUTOR
    };
    let account_id = acc.id;
    let mut active: account::ActiveModel = acc.into();
    if set_org {
        active.organization_id = Set(Some(organization_id));
    }
    if set_role {
        active.organization_role = Set(Some(role.to_string()));
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    tracing::debug!("Linked account {} to organization {}", account_id, organization_id);
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_account_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<account::Model>, DbErr> {
    Account::find()
        .filter(account::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
}

/// Find an account by email or create it
pub async fn get_or_onboard_for_email(
    db: &DatabaseConnection,
    email: &str,
    full_name: Option<String>,
    utm_source: &str,
) -> Result<account::Model, DbErr> {
    if let Some(existing) = find_account_by_email(db, email).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let acc = account::ActiveModel {
        email: Set(normalize_email(email)),
        full_name: Set(full_name),
        utm_source: Set(Some(utm_source.to_string())),
        organization_id: Set(None),
        organization_role: Set(None),
        organization_user_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let acc = acc.insert(db).await?;
    tracing::info!("Onboarded account {} via {}", acc.id, utm_source);
    Ok(acc)
}

async fn get_or_onboard_for_hubspot(
    db: &DatabaseConnection,
    owners: &[Owner],
    warnings: &mut Warnings,
) -> Result<Vec<account::Model>, DbErr> {
    tracing::info!("Onboarding up to {} HubSpot owners", owners.len());
    let mut accounts = Vec::with_capacity(owners.len());

    for owner in owners {
        let Some(email) = owner.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            warnings.push(ReconciliationWarning::OwnerWithoutEmail {
                owner_id: owner.id.clone(),
            });
            continue;
        };

        let mut acc =
            get_or_onboard_for_email(db, email, owner.full_name(), HUBSPOT_UTM_SOURCE).await?;
        if acc.organization_user_id.is_none() {
            let mut active: account::ActiveModel = acc.into();
            active.organization_user_id = Set(Some(owner.id.clone()));
            active.updated_at = Set(Utc::now());
            acc = active.update(db).await?;
        }
        tracing::debug!("HubSpot owner {} yielded account {}", owner.id, acc.id);
        accounts.push(acc);
    }

    Ok(accounts)
}

/// The admin's organization, or a new one with the admin as owner
pub async fn get_or_create_organization_for_account(
    db: &DatabaseConnection,
    admin_account: Option<&account::Model>,
    name: Option<&str>,
) -> Result<organization::Model, DbErr> {
    if let Some(org_id) = admin_account.and_then(|a| a.organization_id) {
        if let Some(org) = Organization::find_by_id(org_id).one(db).await? {
            return Ok(org);
        }
    }

    let now = Utc::now();
    let org = organization::ActiveModel {
        name: Set(name.map(String::from)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let org = org.insert(db).await?;
    tracing::info!("Created organization {}", org.id);

    if let Some(admin) = admin_account {
        let set_role = admin.organization_role.is_none();
        let mut active: account::ActiveModel = admin.clone().into();
        active.organization_id = Set(Some(org.id));
        if set_role {
            active.organization_role = Set(Some(account::ORGANIZATION_ROLE_OWNER.to_string()));
        }
        active.updated_at = Set(now);
        active.update(db).await?;
    }

    Ok(org)
}

pub async fn find_pipeline_for_external_org(
    db: &DatabaseConnection,
    external_org_id: &str,
    destination_id: i32,
) -> Result<Option<pipeline::Model>, DbErr> {
    Pipeline::find()
        .filter(pipeline::Column::ExternalOrgId.eq(external_org_id))
        .filter(pipeline::Column::DestinationId.eq(destination_id))
        .one(db)
        .await
}

/// Pipeline for the external org, falling back to an organization's pipeline
/// that has no external id yet.
pub async fn get_or_create_pipeline(
    db: &DatabaseConnection,
    external_org_id: &str,
    organization_id: i64,
    destination_id: i32,
) -> Result<pipeline::Model, DbErr> {
    if let Some(existing) =
        find_pipeline_for_external_org(db, external_org_id, destination_id).await?
    {
        return Ok(existing);
    }

    let unlinked = Pipeline::find()
        .filter(pipeline::Column::OrganizationId.eq(organization_id))
        .filter(pipeline::Column::DestinationId.eq(destination_id))
        .filter(pipeline::Column::ExternalOrgId.is_null())
        .one(db)
        .await?;
    if let Some(existing) = unlinked {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = pipeline::ActiveModel {
        external_org_id: Set(Some(external_org_id.to_string())),
        organization_id: Set(organization_id),
        destination_id: Set(destination_id),
        oauth_data_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = created.insert(db).await?;
    tracing::info!(
        "Created pipeline {} for organization {}",
        created.id,
        organization_id
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_redirect_url() {
        assert_eq!(
            status_redirect_url("https://app.dumpsheet.com", "success", Some(7)),
            "https://app.dumpsheet.com?hubspot_status=success&account_id=7"
        );
        assert_eq!(
            status_redirect_url("https://app.dumpsheet.com", "success", None),
            "https://app.dumpsheet.com?hubspot_status=success&account_id="
        );
        assert_eq!(
            status_redirect_url("https://app.example.com/?tab=crm", "error", None),
            "https://app.example.com/?tab=crm&hubspot_status=error&account_id="
        );
    }

    #[test]
    fn test_parse_state() {
        let mut warnings = Warnings::default();
        assert_eq!(parse_account_id_from_state(Some(" 42 "), &mut warnings), Some(42));
        assert_eq!(parse_account_id_from_state(Some(""), &mut warnings), None);
        assert_eq!(parse_account_id_from_state(None, &mut warnings), None);
        assert!(warnings.0.is_empty());

        assert_eq!(parse_account_id_from_state(Some("abc"), &mut warnings), None);
        assert_eq!(
            warnings.0,
            vec![ReconciliationWarning::InvalidState {
                state: "abc".to_string()
            }]
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Peter@Example.COM "), "peter@example.com");
    }
}

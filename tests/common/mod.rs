//! Test helpers shared by the integration tests.
//!
//! Provides an in-memory database, an in-process HubSpot fake, a canned form
//! filler, a recording email sender and row fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};

use hubsync::migrations::Migrator;
use hubsync::models::{account, oauth_data, organization, pipeline, DESTINATION_HUBSPOT_ID};
use hubsync::services::forms::{FormData, FormDefinition, FormName};
use hubsync::services::hubspot::{
    AccessTokenInfo, AssociationType, CrmObject, HubspotApi, ObjectType, Owner, Properties,
    PropertyDefinition, TokenGrant, VendorError,
};
use hubsync::services::notification::{EmailMessage, EmailSender, NotifyError};
use hubsync::services::sync::{FillError, FormFiller};

pub const HUB_ID: i64 = 43920988;
pub const HUB_DOMAIN: &str = "dumpsheet-dev.com";
pub const ADMIN_EMAIL: &str = "peter@dumpsheet.com";
pub const REFRESH_TOKEN: &str = "6f0d2b7a-1c55-4f3e-9a55-7d3f6e7c1a10";
pub const ROTATED_REFRESH_TOKEN: &str = "0b7c6a1e-94d3-4b52-8a2f-3e4d5c6b7a89";
pub const APP_BASE_URL: &str = "https://app.dumpsheet.com";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

// ============================================================================
// HubSpot fake
// ============================================================================

/// Every call made against [`FakeHubspotApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ExchangeCode(String),
    Refresh(String),
    AccessTokenInfo(String),
    ListOwners(String),
    CreateObject {
        token: String,
        object_type: ObjectType,
        properties: Properties,
    },
    CreateAssociation {
        from_id: String,
        to_type: ObjectType,
        to_id: String,
        association_id: i32,
    },
    ListProperties(ObjectType),
}

/// In-process stand-in for the HubSpot REST API.
///
/// Successful creates echo the properties back with a fresh `hs_object_id`.
pub struct FakeHubspotApi {
    pub exchange: Mutex<Result<TokenGrant, VendorError>>,
    pub refresh: Mutex<Result<TokenGrant, VendorError>>,
    pub token_info: Mutex<Result<AccessTokenInfo, VendorError>>,
    pub owners: Mutex<Result<Vec<Owner>, VendorError>>,
    pub properties: Mutex<Result<Vec<PropertyDefinition>, VendorError>>,
    pub create_failures: Mutex<HashMap<ObjectType, VendorError>>,
    pub association_failure: Mutex<Option<VendorError>>,
    pub calls: Mutex<Vec<ApiCall>>,
    next_object_id: Mutex<u64>,
}

impl Default for FakeHubspotApi {
    fn default() -> Self {
        Self {
            exchange: Mutex::new(Ok(grant("access-from-code", REFRESH_TOKEN, 1800))),
            refresh: Mutex::new(Ok(grant("access-refreshed", REFRESH_TOKEN, 1800))),
            token_info: Mutex::new(Ok(token_info(HUB_ID, Some(ADMIN_EMAIL)))),
            owners: Mutex::new(Ok(vec![
                owner("466328885", Some(ADMIN_EMAIL), "Peter", "Csiba"),
                owner("550982168", Some("lucas@dumpsheet.com"), "Lucas", "Meyer"),
            ])),
            properties: Mutex::new(Ok(Vec::new())),
            create_failures: Mutex::new(HashMap::new()),
            association_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            next_object_id: Mutex::new(1000),
        }
    }
}

impl FakeHubspotApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_exchange(&self, result: Result<TokenGrant, VendorError>) {
        *self.exchange.lock() = result;
    }

    pub fn set_refresh(&self, result: Result<TokenGrant, VendorError>) {
        *self.refresh.lock() = result;
    }

    pub fn set_token_info(&self, result: Result<AccessTokenInfo, VendorError>) {
        *self.token_info.lock() = result;
    }

    pub fn set_owners(&self, result: Result<Vec<Owner>, VendorError>) {
        *self.owners.lock() = result;
    }

    pub fn set_properties(&self, result: Result<Vec<PropertyDefinition>, VendorError>) {
        *self.properties.lock() = result;
    }

    pub fn fail_create(&self, object_type: ObjectType, err: VendorError) {
        self.create_failures.lock().insert(object_type, err);
    }

    pub fn fail_associations(&self, err: VendorError) {
        *self.association_failure.lock() = Some(err);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ApiCall::Refresh(_)))
            .count()
    }

    pub fn exchange_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ApiCall::ExchangeCode(_)))
            .count()
    }

    /// Payloads of all create calls (including failed ones) for a type
    pub fn created(&self, object_type: ObjectType) -> Vec<Properties> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ApiCall::CreateObject {
                    object_type: t,
                    properties,
                    ..
                } if *t == object_type => Some(properties.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn create_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ApiCall::CreateObject { .. }))
            .count()
    }

    /// (from contact id, to id, association type id)
    pub fn associations(&self) -> Vec<(String, String, i32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ApiCall::CreateAssociation {
                    from_id,
                    to_id,
                    association_id,
                    ..
                } => Some((from_id.clone(), to_id.clone(), *association_id)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl HubspotApi for FakeHubspotApi {
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, VendorError> {
        self.calls.lock().push(ApiCall::ExchangeCode(code.to_string()));
        self.exchange.lock().clone()
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, VendorError> {
        self.calls
            .lock()
            .push(ApiCall::Refresh(refresh_token.to_string()));
        self.refresh.lock().clone()
    }

    async fn access_token_info(&self, access_token: &str) -> Result<AccessTokenInfo, VendorError> {
        self.calls
            .lock()
            .push(ApiCall::AccessTokenInfo(access_token.to_string()));
        self.token_info.lock().clone()
    }

    async fn list_owners(&self, access_token: &str) -> Result<Vec<Owner>, VendorError> {
        self.calls
            .lock()
            .push(ApiCall::ListOwners(access_token.to_string()));
        self.owners.lock().clone()
    }

    async fn create_object(
        &self,
        access_token: &str,
        object_type: ObjectType,
        properties: &Properties,
    ) -> Result<CrmObject, VendorError> {
        self.calls.lock().push(ApiCall::CreateObject {
            token: access_token.to_string(),
            object_type,
            properties: properties.clone(),
        });
        if let Some(err) = self.create_failures.lock().get(&object_type) {
            return Err(err.clone());
        }

        let id = {
            let mut next = self.next_object_id.lock();
            *next += 1;
            next.to_string()
        };
        let mut echoed = properties.clone();
        echoed.insert("hs_object_id".to_string(), Value::String(id.clone()));
        Ok(CrmObject {
            id,
            properties: echoed,
        })
    }

    async fn create_association(
        &self,
        _access_token: &str,
        _from_type: ObjectType,
        from_id: &str,
        to_type: ObjectType,
        to_id: &str,
        association: AssociationType,
    ) -> Result<Value, VendorError> {
        self.calls.lock().push(ApiCall::CreateAssociation {
            from_id: from_id.to_string(),
            to_type,
            to_id: to_id.to_string(),
            association_id: association.id(),
        });
        if let Some(err) = self.association_failure.lock().clone() {
            return Err(err);
        }
        Ok(json!({
            "fromObjectId": from_id,
            "toObjectId": to_id,
            "labels": []
        }))
    }

    async fn list_properties(
        &self,
        _access_token: &str,
        object_type: ObjectType,
    ) -> Result<Vec<PropertyDefinition>, VendorError> {
        self.calls.lock().push(ApiCall::ListProperties(object_type));
        self.properties.lock().clone()
    }
}

pub fn grant(access_token: &str, refresh_token: &str, expires_in: i64) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: Some(refresh_token.to_string()),
        expires_in,
        token_type: Some("bearer".to_string()),
    }
}

pub fn token_info(hub_id: i64, user: Option<&str>) -> AccessTokenInfo {
    AccessTokenInfo {
        hub_id,
        hub_domain: Some(HUB_DOMAIN.to_string()),
        user: user.map(String::from),
        user_id: Some(1),
        app_id: Some(2150554),
        scopes: vec!["crm.objects.contacts.write".to_string()],
    }
}

pub fn owner(id: &str, email: Option<&str>, first_name: &str, last_name: &str) -> Owner {
    Owner {
        id: id.to_string(),
        email: email.map(String::from),
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        user_id: None,
    }
}

pub fn conflict_error() -> VendorError {
    VendorError::new(
        409,
        r#"{"status":"error","message":"Contact already exists. Existing ID: 12345","category":"CONFLICT"}"#,
    )
}

// ============================================================================
// Form filler fake
// ============================================================================

/// Returns canned values per form, or an error for forms without values
#[derive(Default)]
pub struct FakeFormFiller {
    pub values: HashMap<FormName, Value>,
    pub calls: Mutex<Vec<(FormName, bool)>>,
}

impl FakeFormFiller {
    pub fn with(mut self, form_name: FormName, values: Value) -> Self {
        self.values.insert(form_name, values);
        self
    }

    /// Values of a realistic note for all three forms
    pub fn complete() -> Self {
        Self::default()
            .with(
                FormName::HubspotContact,
                json!({
                    "firstname": "Lucas",
                    "lastname": "Meyer",
                    "email": "lucas.meyer@example.com",
                    "city": "Zurich",
                    "industry": "Travel",
                    "unknown_field": "dropped"
                }),
            )
            .with(
                FormName::HubspotMeeting,
                json!({
                    "hs_call_title": "Tennis chat with Lucas",
                    "hs_call_body": "<ul><li>Talked about VRBO</li></ul>",
                    "hs_call_direction": "OUTBOUND",
                    "hs_call_status": "COMPLETED"
                }),
            )
            .with(
                FormName::HubspotTask,
                json!({
                    "hs_task_subject": "Send VRBO details",
                    "hs_task_body": "Email Lucas the listing",
                    "hs_task_priority": "HIGH"
                }),
            )
    }

    pub fn calls(&self) -> Vec<(FormName, bool)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FormFiller for FakeFormFiller {
    async fn fill_in_form(
        &self,
        form: &FormDefinition,
        _text: &str,
        use_current_time: bool,
    ) -> Result<FormData, FillError> {
        self.calls.lock().push((form.form_name, use_current_time));
        let values = self
            .values
            .get(&form.form_name)
            .and_then(Value::as_object)
            .ok_or_else(|| FillError(format!("no answer for {}", form.form_name.as_str())))?;
        Ok(FormData::from_values(form.clone(), values))
    }
}

pub const LONG_NOTE: &str = "Met Lucas Meyer from Zurich at the tennis club, he runs a travel \
    agency and wants the VRBO listing details by Friday.";

// ============================================================================
// Email fake
// ============================================================================

#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingEmailSender {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Send("connection refused".to_string()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub async fn create_account(
    db: &DatabaseConnection,
    email: &str,
    organization_id: Option<i64>,
    organization_role: Option<&str>,
) -> account::Model {
    let now = Utc::now();
    account::ActiveModel {
        email: Set(email.to_string()),
        full_name: Set(None),
        utm_source: Set(None),
        organization_id: Set(organization_id),
        organization_role: Set(organization_role.map(String::from)),
        organization_user_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_organization(db: &DatabaseConnection, name: Option<&str>) -> organization::Model {
    let now = Utc::now();
    organization::ActiveModel {
        name: Set(name.map(String::from)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_pipeline(
    db: &DatabaseConnection,
    external_org_id: Option<&str>,
    organization_id: i64,
    oauth_data_id: Option<i64>,
) -> pipeline::Model {
    let now = Utc::now();
    pipeline::ActiveModel {
        external_org_id: Set(external_org_id.map(String::from)),
        organization_id: Set(organization_id),
        destination_id: Set(DESTINATION_HUBSPOT_ID),
        oauth_data_id: Set(oauth_data_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_oauth_data(
    db: &DatabaseConnection,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> oauth_data::Model {
    oauth_data::ActiveModel {
        token_type: Set(oauth_data::OAUTH_DATA_TOKEN_TYPE_OAUTH.to_string()),
        access_token: Set(access_token.map(String::from)),
        refresh_token: Set(refresh_token.map(String::from)),
        expires_at: Set(expires_at),
        refreshed_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// A credential whose access token is still good for an hour
pub async fn create_fresh_oauth_data(db: &DatabaseConnection) -> oauth_data::Model {
    create_oauth_data(
        db,
        Some("access-stored"),
        Some(REFRESH_TOKEN),
        Some(Utc::now() + Duration::hours(1)),
    )
    .await
}

/// A credential whose access token expired a minute ago
pub async fn create_expired_oauth_data(db: &DatabaseConnection) -> oauth_data::Model {
    create_oauth_data(
        db,
        Some("access-stale"),
        Some(REFRESH_TOKEN),
        Some(Utc::now() - Duration::minutes(1)),
    )
    .await
}

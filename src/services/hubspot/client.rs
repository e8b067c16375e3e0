use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde_json::Value;

use super::api::{AccessTokenInfo, HubspotApi, Owner, Properties, PropertyDefinition};
use super::error::CrmError;
use super::response::ApiResponse;
use super::token::{ensure_fresh, CredentialHandle};
use super::types::{is_allowed_field, AssociationType, ObjectType};

/// CRM gateway bound to one stored credential.
///
/// Every call first makes sure the access token is fresh, then talks to
/// HubSpot through the [`HubspotApi`] transport.
pub struct HubspotClient {
    db: DatabaseConnection,
    api: Arc<dyn HubspotApi>,
    credential: CredentialHandle,
}

impl HubspotClient {
    pub fn new(db: DatabaseConnection, api: Arc<dyn HubspotApi>, oauth_data_id: i64) -> Self {
        tracing::debug!("Initializing HubspotClient for oauth_data {}", oauth_data_id);
        Self {
            db,
            api,
            credential: CredentialHandle::new(oauth_data_id),
        }
    }

    pub fn oauth_data_id(&self) -> i64 {
        self.credential.oauth_data_id
    }

    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }

    async fn access_token(&mut self) -> Result<String, CrmError> {
        ensure_fresh(&self.db, self.api.as_ref(), &mut self.credential).await
    }

    pub async fn create_contact(&mut self, properties: &Properties) -> Result<ApiResponse, CrmError> {
        self.create_object("contact create", ObjectType::Contact, properties)
            .await
    }

    pub async fn create_call(&mut self, properties: &Properties) -> Result<ApiResponse, CrmError> {
        self.create_object("call create", ObjectType::Call, properties)
            .await
    }

    pub async fn create_task(&mut self, properties: &Properties) -> Result<ApiResponse, CrmError> {
        self.create_object("task create", ObjectType::Task, properties)
            .await
    }

    async fn create_object(
        &mut self,
        endpoint: &str,
        object_type: ObjectType,
        properties: &Properties,
    ) -> Result<ApiResponse, CrmError> {
        let token = self.access_token().await?;
        let payload = filter_properties(properties);

        match self.api.create_object(&token, object_type, &payload).await {
            Ok(object) => {
                tracing::info!("HubSpot {} succeeded with id {}", endpoint, object.id);
                Ok(ApiResponse::from_object(200, object))
            }
            Err(e) => {
                let err = CrmError::api(endpoint, &e);
                let fields: Vec<&str> = payload.keys().map(String::as_str).collect();
                tracing::error!(
                    "HubSpot {} failed with HTTP {} for fields {:?}: {}",
                    endpoint,
                    e.status,
                    fields,
                    err.message()
                );
                Err(err)
            }
        }
    }

    /// Link two objects with a HubSpot-defined association
    pub async fn create_association(
        &mut self,
        from_type: ObjectType,
        from_id: &str,
        to_type: ObjectType,
        to_id: &str,
        association: AssociationType,
    ) -> Result<Value, CrmError> {
        let token = self.access_token().await?;
        let result = self
            .api
            .create_association(&token, from_type, from_id, to_type, to_id, association)
            .await
            .map_err(|e| {
                tracing::error!(
                    "HubSpot association {} {} -> {} {} failed: {}",
                    from_type,
                    from_id,
                    to_type,
                    to_id,
                    e
                );
                CrmError::api("association create", &e)
            })?;
        tracing::info!(
            "Association created {} {} -> {} {} (type {})",
            from_type,
            from_id,
            to_type,
            to_id,
            association.id()
        );
        Ok(result)
    }

    pub async fn list_owners(&mut self) -> Result<Vec<Owner>, CrmError> {
        let token = self.access_token().await?;
        let owners = self
            .api
            .list_owners(&token)
            .await
            .map_err(|e| CrmError::api("owners list", &e))?;
        tracing::debug!("list_owners returned {} owners", owners.len());
        Ok(owners)
    }

    /// Hub id, hub domain and the granting user of the current token
    pub async fn get_account_metadata(&mut self) -> Result<AccessTokenInfo, CrmError> {
        let token = self.access_token().await?;
        let info = self
            .api
            .access_token_info(&token)
            .await
            .map_err(|e| CrmError::api("access token info", &e))?;
        tracing::debug!(
            "get_account_metadata returned hub_id={} hub_domain={:?}",
            info.hub_id,
            info.hub_domain
        );
        Ok(info)
    }

    pub async fn list_properties(
        &mut self,
        object_type: ObjectType,
    ) -> Result<Vec<PropertyDefinition>, CrmError> {
        let token = self.access_token().await?;
        self.api
            .list_properties(&token, object_type)
            .await
            .map_err(|e| CrmError::api("properties list", &e))
    }
}

/// Keep allow-listed, non-null properties
pub fn filter_properties(properties: &Properties) -> Properties {
    properties
        .iter()
        .filter(|(name, value)| {
            if !is_allowed_field(name) {
                tracing::debug!("Dropping unknown HubSpot field {}", name);
                return false;
            }
            !value.is_null()
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

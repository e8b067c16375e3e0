//! Turn a free-text note into a HubSpot contact with a logged call and a
//! follow-up task.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::forms::{get_form, FormData, FormDefinition, FormName};
use crate::services::hubspot::{ApiResponse, AssociationType, FieldName, HubspotClient, ObjectType};
use crate::services::hubspot_object::{HubspotDataEntry, HubspotObject, SyncState};

/// Notes shorter than this are not worth extracting from
pub const MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Error)]
#[error("Form fill failed: {0}")]
pub struct FillError(pub String);

/// Extracts form values from free text (a language model in production)
#[async_trait]
pub trait FormFiller: Send + Sync {
    /// With `use_current_time`, date fields default to now
    async fn fill_in_form(
        &self,
        form: &FormDefinition,
        text: &str,
        use_current_time: bool,
    ) -> Result<FormData, FillError>;
}

/// Extract a contact, call and task from `text` and push them to HubSpot.
///
/// Failures of individual objects do not stop the others; the resulting
/// state says how far the sync got.
pub async fn extract_and_sync_contact_with_follow_up(
    client: &mut HubspotClient,
    filler: &dyn FormFiller,
    text: &str,
    hub_id: Option<&str>,
    hubspot_owner_id: Option<i64>,
) -> HubspotDataEntry {
    if text.chars().count() < MIN_TEXT_CHARS {
        tracing::warn!("Transcript too short to infer data ({} chars)", text.chars().count());
        return HubspotDataEntry::new(text, SyncState::Short);
    }

    // Contact
    let contact_form = get_form(FormName::HubspotContact);
    let mut contact_data = match filler.fill_in_form(contact_form, text, false).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Could not extract contact: {}", e);
            return HubspotDataEntry::new(text, SyncState::ErrorGpt);
        }
    };
    if contact_data.count_set_fields() <= 1 {
        tracing::warn!(
            "Incomplete data entry, only {} contact fields extracted",
            contact_data.count_set_fields()
        );
        return HubspotDataEntry::new(text, SyncState::Incomplete);
    }
    add_hubspot_owner_id(&mut contact_data, hubspot_owner_id);
    let contact_response: ApiResponse = client
        .create_contact(&contact_data.to_properties())
        .await
        .into();

    // Call
    let call_form = get_form(FormName::HubspotMeeting);
    let call_data = fill_optional(filler, call_form, text, hubspot_owner_id).await;
    let call_response = match &call_data {
        Some(data) => Some(ApiResponse::from(
            client.create_call(&data.to_properties()).await,
        )),
        None => None,
    };

    // Task
    let task_form = get_form(FormName::HubspotTask);
    let task_data = fill_optional(filler, task_form, text, hubspot_owner_id).await;
    let task_response = match &task_data {
        Some(data) => Some(ApiResponse::from(
            client.create_task(&data.to_properties()).await,
        )),
        None => None,
    };

    // Associations
    let contact_id = contact_response.hs_object_id.as_deref();
    let call_id = call_response.as_ref().and_then(|r| r.hs_object_id.as_deref());
    let task_id = task_response.as_ref().and_then(|r| r.hs_object_id.as_deref());

    let contact_to_call_result = match (contact_id, call_id) {
        (Some(contact_id), Some(call_id)) => {
            associate(
                client,
                contact_id,
                ObjectType::Call,
                call_id,
                AssociationType::ContactToCall,
            )
            .await
        }
        _ => None,
    };
    let contact_to_task_result = match (contact_id, task_id) {
        (Some(contact_id), Some(task_id)) => {
            associate(
                client,
                contact_id,
                ObjectType::Task,
                task_id,
                AssociationType::ContactToTask,
            )
            .await
        }
        _ => None,
    };

    let all_created = contact_response.is_success()
        && call_response.as_ref().is_some_and(ApiResponse::is_success)
        && task_response.as_ref().is_some_and(ApiResponse::is_success);
    let state = if all_created {
        SyncState::Success
    } else if call_data.is_none() || task_data.is_none() {
        SyncState::ErrorGpt
    } else if contact_response.status == 409 {
        SyncState::WarningAlreadyCreated
    } else {
        SyncState::ErrorHubspotSync
    };
    tracing::info!("HubSpot sync finished with state {}", state);

    HubspotDataEntry {
        transcript: text.to_string(),
        state,
        contact: HubspotObject::from_properties(
            hub_id,
            ObjectType::Contact,
            contact_form,
            contact_response.props_if_ok(),
        ),
        call: HubspotObject::from_properties(
            hub_id,
            ObjectType::Call,
            call_form,
            call_response.as_ref().and_then(ApiResponse::props_if_ok),
        ),
        task: HubspotObject::from_properties(
            hub_id,
            ObjectType::Task,
            task_form,
            task_response.as_ref().and_then(ApiResponse::props_if_ok),
        ),
        contact_to_call_result,
        contact_to_task_result,
        gpt_contact: HubspotObject::from_properties(
            hub_id,
            ObjectType::Contact,
            contact_form,
            Some(&contact_data.to_properties()),
        ),
        gpt_call: call_data.as_ref().and_then(|data| {
            HubspotObject::from_properties(
                hub_id,
                ObjectType::Call,
                call_form,
                Some(&data.to_properties()),
            )
        }),
        gpt_task: task_data.as_ref().and_then(|data| {
            HubspotObject::from_properties(
                hub_id,
                ObjectType::Task,
                task_form,
                Some(&data.to_properties()),
            )
        }),
    }
}

/// Fill a follow-up form with the current time as default date
async fn fill_optional(
    filler: &dyn FormFiller,
    form: &FormDefinition,
    text: &str,
    hubspot_owner_id: Option<i64>,
) -> Option<FormData> {
    match filler.fill_in_form(form, text, true).await {
        Ok(mut data) => {
            add_hubspot_owner_id(&mut data, hubspot_owner_id);
            Some(data)
        }
        Err(e) => {
            tracing::error!("Could not extract {}: {}", form.form_name.as_str(), e);
            None
        }
    }
}

async fn associate(
    client: &mut HubspotClient,
    contact_id: &str,
    to_type: ObjectType,
    to_id: &str,
    association: AssociationType,
) -> Option<Value> {
    match client
        .create_association(ObjectType::Contact, contact_id, to_type, to_id, association)
        .await
    {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!("Could not associate contact {} with {} {}: {}", contact_id, to_type, to_id, e);
            None
        }
    }
}

fn add_hubspot_owner_id(data: &mut FormData, hubspot_owner_id: Option<i64>) {
    if let Some(owner_id) = hubspot_owner_id {
        if !data.set_field_value(FieldName::HubspotOwnerId.as_str(), json!(owner_id)) {
            tracing::warn!(
                "Cannot set hubspot_owner_id {} on {}",
                owner_id,
                data.form().form_name.as_str()
            );
        }
    }
}

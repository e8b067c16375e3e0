//! Display shims for synced (or merely extracted) HubSpot objects.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::forms::{FieldDefinition, FormDefinition, MISSING_VALUE};
use crate::services::hubspot::{FieldName, ObjectType, Properties};

/// Values of one CRM object, restricted to the fields of its form
#[derive(Debug, Clone)]
pub struct HubspotObject {
    pub hub_id: Option<i64>,
    pub object_type: ObjectType,
    pub form: FormDefinition,
    data: Properties,
}

impl HubspotObject {
    pub fn new(hub_id: Option<&str>, object_type: ObjectType, form: FormDefinition) -> Self {
        let hub_id = hub_id.and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Invalid hub_id {}, expected an integer: {}", raw, e);
                None
            }
        });
        Self {
            hub_id,
            object_type,
            form,
            data: Properties::new(),
        }
    }

    /// Build from API response properties (or form values). HubSpot returns
    /// many more properties than the form has; those are ignored.
    pub fn from_properties(
        hub_id: Option<&str>,
        object_type: ObjectType,
        form: &FormDefinition,
        properties: Option<&Properties>,
    ) -> Option<Self> {
        let properties = properties?;
        let mut object = Self::new(hub_id, object_type, form.clone());
        for (name, value) in properties {
            object.set_field_value(name, value.clone());
        }
        Some(object)
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.form.get_field(name)
    }

    /// Returns false when the form has no such field
    pub fn set_field_value(&mut self, name: &str, value: Value) -> bool {
        if self.get_field(name).is_none() {
            return false;
        }
        self.data.insert(name.to_string(), value);
        true
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn display_value(&self, name: &str) -> String {
        self.form.display_value(name, self.data.get(name))
    }

    /// Label and display value of a field, with the record id rendered as a
    /// link to the HubSpot web UI when possible.
    pub fn display_label_with_value(&self, name: &str) -> Option<(String, String)> {
        let field = self.get_field(name)?;
        let mut value = None;
        if name == FieldName::HsObjectId.as_str() {
            value = self.link().map(|href| {
                format!(
                    r#"<a href="{}">{} - See in Hubspot (Web)</a>"#,
                    href,
                    self.display_value(name)
                )
            });
        }
        let value = value.unwrap_or_else(|| self.display_value(name));
        Some((field.label.clone(), value))
    }

    /// Web UI link. Only contacts can be linked.
    pub fn link(&self) -> Option<String> {
        let hub_id = self.hub_id?;
        if self.object_type != ObjectType::Contact {
            return None;
        }
        let object_id = self.display_value(FieldName::HsObjectId.as_str());
        Some(format!(
            "https://app.hubspot.com/contacts/{}/record/{}/{}/view/1",
            hub_id,
            ObjectType::Contact.type_id(),
            object_id
        ))
    }
}

/// Outcome of syncing one note into HubSpot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    New,
    /// Text too short to extract anything
    Short,
    /// Too few contact fields extracted
    Incomplete,
    ErrorGpt,
    ErrorHubspotSync,
    WarningAlreadyCreated,
    Success,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::New => "new",
            SyncState::Short => "short",
            SyncState::Incomplete => "incomplete",
            SyncState::ErrorGpt => "error_gpt",
            SyncState::ErrorHubspotSync => "error_hubspot_sync",
            SyncState::WarningAlreadyCreated => "warning_already_created",
            SyncState::Success => "success",
        }
    }

    /// First letter upper-cased, e.g. `Error_gpt`
    pub fn capitalized(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Whether the note needs to be re-entered with more detail
    pub fn needs_more_information(&self) -> bool {
        matches!(self, SyncState::Short | SyncState::Incomplete)
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything known about one sync: what HubSpot stored and what was extracted
#[derive(Debug, Clone)]
pub struct HubspotDataEntry {
    pub transcript: String,
    pub state: SyncState,

    pub contact: Option<HubspotObject>,
    pub call: Option<HubspotObject>,
    pub task: Option<HubspotObject>,
    pub contact_to_call_result: Option<Value>,
    pub contact_to_task_result: Option<Value>,

    pub gpt_contact: Option<HubspotObject>,
    pub gpt_call: Option<HubspotObject>,
    pub gpt_task: Option<HubspotObject>,
}

impl HubspotDataEntry {
    pub fn new(transcript: impl Into<String>, state: SyncState) -> Self {
        Self {
            transcript: transcript.into(),
            state,
            contact: None,
            call: None,
            task: None,
            contact_to_call_result: None,
            contact_to_task_result: None,
            gpt_contact: None,
            gpt_call: None,
            gpt_task: None,
        }
    }

    /// Synced contact name, then the extracted one, then "Unknown"
    pub fn contact_name(&self) -> String {
        [self.contact.as_ref(), self.gpt_contact.as_ref()]
            .into_iter()
            .flatten()
            .find_map(person_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

fn person_name(object: &HubspotObject) -> Option<String> {
    let parts: Vec<String> = [FieldName::Firstname, FieldName::Lastname]
        .iter()
        .map(|f| object.display_value(f.as_str()))
        .filter(|v| !v.trim().is_empty() && v != MISSING_VALUE)
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

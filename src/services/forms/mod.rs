//! Form definitions describing which HubSpot properties we fill and how they
//! are labelled, plus the values filled into them.

mod library;

pub use library::{get_form, HUBSPOT_CALL_FORM, HUBSPOT_CONTACT_FORM, HUBSPOT_TASK_FORM};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::hubspot::{is_allowed_field, Properties, PropertyDefinition};

/// Placeholder rendered for missing values and unknown fields
pub const MISSING_VALUE: &str = "None";

// ============================================================================
// Field definitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    PhoneNumber,
    Select,
    Radio,
    Checkbox,
    BooleanCheckbox,
    Date,
    Html,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::PhoneNumber => "phonenumber",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::BooleanCheckbox => "booleancheckbox",
            FieldType::Date => "date",
            FieldType::Html => "html",
        }
    }

    /// Parse HubSpot's `fieldType`, treating anything unknown as text
    pub fn parse(s: &str) -> Self {
        match s {
            "textarea" => FieldType::Textarea,
            "number" => FieldType::Number,
            "phonenumber" => FieldType::PhoneNumber,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "booleancheckbox" => FieldType::BooleanCheckbox,
            "date" => FieldType::Date,
            "html" => FieldType::Html,
            "text" => FieldType::Text,
            other => {
                tracing::debug!("Unknown field type {}, treating as text", other);
                FieldType::Text
            }
        }
    }

    fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub label: String,
    pub description: String,
    pub options: Vec<FieldOption>,
    /// Never asked for when filling the form from text
    pub ignore_in_prompt: bool,
    /// Not shown in summaries
    pub ignore_in_display: bool,
    pub ignore_in_email: bool,
    pub custom_field: bool,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType, label: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            label: label.to_string(),
            description: description.to_string(),
            options: Vec::new(),
            ignore_in_prompt: false,
            ignore_in_display: false,
            ignore_in_email: false,
            custom_field: false,
        }
    }

    pub fn with_options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(label, value)| FieldOption::new(label, value))
            .collect();
        self
    }

    pub fn ignore_in_prompt(mut self) -> Self {
        self.ignore_in_prompt = true;
        self
    }

    pub fn ignore_in_display(mut self) -> Self {
        self.ignore_in_display = true;
        self
    }

    /// Human readable value: option labels for select/radio, "None" when missing
    pub fn display_value(&self, value: Option<&Value>) -> String {
        let raw = match value {
            None | Some(Value::Null) => return MISSING_VALUE.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        if self.field_type.has_options() {
            if let Some(option) = self.options.iter().find(|o| o.value == raw) {
                return option.label.clone();
            }
        }
        raw
    }

    fn from_property(property: &PropertyDefinition) -> Self {
        Self {
            name: property.name.clone(),
            field_type: FieldType::parse(&property.field_type),
            label: property.label.clone(),
            description: property.description.clone(),
            options: property
                .options
                .iter()
                .map(|o| FieldOption::new(&o.label, &o.value))
                .collect(),
            ignore_in_prompt: false,
            ignore_in_display: property.hidden,
            ignore_in_email: false,
            custom_field: false,
        }
    }
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormName {
    HubspotContact,
    /// Logged calls
    HubspotMeeting,
    HubspotTask,
}

impl FormName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormName::HubspotContact => "hubspot_contact",
            FormName::HubspotMeeting => "hubspot_meeting",
            FormName::HubspotTask => "hubspot_task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub form_name: FormName,
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    pub fn new(form_name: FormName, fields: Vec<FieldDefinition>) -> Self {
        Self { form_name, fields }
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        let field = self.fields.iter().find(|f| f.name == name);
        if field.is_none() {
            tracing::debug!("Field {} not in form {}", name, self.form_name.as_str());
        }
        field
    }

    /// Display value of `name`, "None" when the field is not part of the form
    pub fn display_value(&self, name: &str, value: Option<&Value>) -> String {
        self.get_field(name)
            .map(|f| f.display_value(value))
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    }
}

/// Build a form from a HubSpot properties listing, keeping allow-listed fields
pub fn form_from_properties(form_name: FormName, properties: &[PropertyDefinition]) -> FormDefinition {
    let fields = properties
        .iter()
        .filter(|p| is_allowed_field(&p.name))
        .map(FieldDefinition::from_property)
        .collect();
    FormDefinition::new(form_name, fields)
}

// ============================================================================
// Form data
// ============================================================================

/// Values filled into a form. Names outside the form are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    form: FormDefinition,
    values: Properties,
}

impl FormData {
    pub fn new(form: FormDefinition) -> Self {
        Self {
            form,
            values: Properties::new(),
        }
    }

    /// Build from raw values, dropping names the form does not know
    pub fn from_values(form: FormDefinition, values: &Properties) -> Self {
        let mut data = Self::new(form);
        for (name, value) in values {
            data.set_field_value(name, value.clone());
        }
        data
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// Returns false when `name` is not a field of this form
    pub fn set_field_value(&mut self, name: &str, value: Value) -> bool {
        if self.form.get_field(name).is_none() {
            return false;
        }
        self.values.insert(name.to_string(), value);
        true
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn count_set_fields(&self) -> usize {
        self.values.values().filter(|v| !v.is_null()).count()
    }

    pub fn to_properties(&self) -> Properties {
        self.values.clone()
    }
}

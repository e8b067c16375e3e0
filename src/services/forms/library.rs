//! The HubSpot forms we fill from notes.

use once_cell::sync::Lazy;

use super::{FieldDefinition, FieldType, FormDefinition, FormName};

const RECORD_ID_DESCRIPTION: &str = "The unique ID for this record. This value is automatically \
     set by HubSpot and may not be modified.";

fn record_id() -> FieldDefinition {
    FieldDefinition::new(
        "hs_object_id",
        FieldType::Number,
        "Record ID",
        RECORD_ID_DESCRIPTION,
    )
    .ignore_in_prompt()
}

fn owner(label: &str, description: &str) -> FieldDefinition {
    FieldDefinition::new("hubspot_owner_id", FieldType::Number, label, description)
        .ignore_in_prompt()
        .ignore_in_display()
}

pub static HUBSPOT_CONTACT_FORM: Lazy<FormDefinition> = Lazy::new(|| {
    FormDefinition::new(
        FormName::HubspotContact,
        vec![
            owner(
                "Contact owner",
                "The owner of a contact. This can be any HubSpot user or Salesforce integration \
                 user, and can be set manually or via Workflows.",
            ),
            FieldDefinition::new(
                "firstname",
                FieldType::Text,
                "First Name",
                "Contacts first name (not surname)",
            ),
            FieldDefinition::new(
                "lastname",
                FieldType::Text,
                "Last Name",
                "Contacts last name (not given name)",
            ),
            FieldDefinition::new("jobtitle", FieldType::Text, "Job Title", "A contact's job title"),
            FieldDefinition::new(
                "company",
                FieldType::Text,
                "Company Name",
                "Name of the contact's company. This can be set independently from the name \
                 property on the contact's associated company.",
            ),
            FieldDefinition::new(
                "industry",
                FieldType::Text,
                "Industry",
                "The Industry a contact is in",
            ),
            FieldDefinition::new("email", FieldType::Text, "Email", "A contact's email address"),
            FieldDefinition::new(
                "phone",
                FieldType::PhoneNumber,
                "Phone Number",
                "A contact's primary phone number",
            ),
            FieldDefinition::new("city", FieldType::Text, "City", "A contact's city of residence"),
            FieldDefinition::new(
                "state",
                FieldType::Text,
                "State/Region",
                "The contact's state of residence.",
            )
            .ignore_in_display(),
            FieldDefinition::new(
                "country",
                FieldType::Text,
                "Country/Region",
                "The contact's country/region of residence.",
            )
            .ignore_in_display(),
            record_id(),
        ],
    )
});

pub static HUBSPOT_CALL_FORM: Lazy<FormDefinition> = Lazy::new(|| {
    FormDefinition::new(
        FormName::HubspotMeeting,
        vec![
            record_id(),
            owner(
                "Activity assigned to",
                "The user that the activity is assigned to in HubSpot. This can be any HubSpot \
                 user or Salesforce integration user, and can be set manually or via Workflows.",
            ),
            FieldDefinition::new(
                "hs_call_callee_object_id",
                FieldType::Number,
                "Callee object id",
                "The ID of the HubSpot record associated with the call. This will be the \
                 recipient of the call for OUTBOUND calls, or the dialer of the call for INBOUND \
                 calls.",
            )
            .ignore_in_prompt(),
            FieldDefinition::new(
                "hs_call_direction",
                FieldType::Select,
                "Call direction",
                "The direction of the call from the perspective of the HubSpot user.",
            )
            .with_options(&[("Inbound", "INBOUND"), ("Outbound", "OUTBOUND")]),
            FieldDefinition::new(
                "hs_call_disposition",
                FieldType::Select,
                "Call outcome",
                "The outcome of the call",
            )
            .with_options(&[
                ("Busy", "9d9162e7-6cf3-4944-bf63-4dff82258764"),
                ("Connected", "f240bbac-87c9-4f6e-bf70-924b57d47db"),
                ("Left live message", "a4c4c377-d246-4b32-a13b-75a56a4cd0ff"),
                ("Left voicemail", "b2cf5968-551e-4856-9783-52b3da59a7d0"),
                ("No answer", "73a0d17f-1163-4015-bdd5-ec830791da20"),
                ("Wrong number", "17b47fee-58de-441e-a44c-c6300d46f273"),
            ]),
            FieldDefinition::new(
                "hs_call_from_number",
                FieldType::Text,
                "From number",
                "The phone number of the person that initiated the call",
            )
            .ignore_in_prompt(),
            FieldDefinition::new(
                "hs_call_status",
                FieldType::Select,
                "Call status",
                "The status of the call",
            )
            .with_options(&[
                ("Busy", "BUSY"),
                ("Calling CRM User", "CALLING_CRM_USER"),
                ("Canceled", "CANCELED"),
                ("Completed", "COMPLETED"),
                ("Connecting", "CONNECTING"),
                ("Failed", "FAILED"),
                ("In Progress", "IN_PROGRESS"),
                ("Missed", "MISSED"),
                ("No Answer", "NO_ANSWER"),
                ("Queued", "QUEUED"),
                ("Ringing", "RINGING"),
            ]),
            FieldDefinition::new(
                "hs_call_title",
                FieldType::Text,
                "Call Title",
                "The title of the call",
            ),
            FieldDefinition::new(
                "hs_call_to_number",
                FieldType::Text,
                "To Number",
                "The phone number of the person that was called",
            ),
            FieldDefinition::new(
                "hs_timestamp",
                FieldType::Date,
                "Activity date",
                "The date that an engagement occurred",
            ),
            FieldDefinition::new(
                "hs_call_body",
                FieldType::Html,
                "Call notes",
                "A concise structured summary of the entire transcript, make sure to include all \
                 facts, if needed label those facts so I can review this in a year and know what \
                 happened. For better readability, use html paragraphs and bullet points.",
            ),
        ],
    )
});

pub static HUBSPOT_TASK_FORM: Lazy<FormDefinition> = Lazy::new(|| {
    FormDefinition::new(
        FormName::HubspotTask,
        vec![
            record_id(),
            owner(
                "Assigned to",
                "The user that the task is assigned to in HubSpot. This can be any HubSpot user \
                 or Salesforce integration user, and can be set manually or via Workflows.",
            ),
            FieldDefinition::new(
                "hs_task_subject",
                FieldType::Text,
                "Task Title",
                "The title of the task",
            ),
            FieldDefinition::new(
                "hs_task_priority",
                FieldType::Select,
                "Priority",
                "The priority of the task",
            )
            .with_options(&[
                ("None", "NONE"),
                ("Low", "LOW"),
                ("Medium", "MEDIUM"),
                ("High", "HIGH"),
            ]),
            FieldDefinition::new(
                "hs_timestamp",
                FieldType::Date,
                "Due date",
                "The due date of the task",
            ),
            // Rendered separately from the task table
            FieldDefinition::new(
                "hs_task_body",
                FieldType::Html,
                "To Dos",
                "Action items and follows ups I need to do in concise bullet points ordered by \
                 priority top down",
            )
            .ignore_in_display(),
        ],
    )
});

pub fn get_form(form_name: FormName) -> &'static FormDefinition {
    match form_name {
        FormName::HubspotContact => &*HUBSPOT_CONTACT_FORM,
        FormName::HubspotMeeting => &*HUBSPOT_CALL_FORM,
        FormName::HubspotTask => &*HUBSPOT_TASK_FORM,
    }
}

//! HubSpot identifiers: the allow-listed property names, association type ids
//! and object type ids. Values are HubSpot's and must not change.

use serde::{Deserialize, Serialize};

/// Properties we read from or write to HubSpot. Anything else is dropped.
///
/// There are also `createdate`, `lastmodifieddate` and `updated_at` on every
/// object, which we ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    // Common object fields
    HsObjectId,
    /// Stored as a string by HubSpot, presented as a number.
    HubspotOwnerId,
    HsTimestamp,
    // Contact: top-level
    Email,
    Firstname,
    Lastname,
    Phone,
    City,
    State,
    Country,
    // Contact: job info
    Company,
    Jobtitle,
    Industry,
    // Contact: lifecycle and marketing
    Lifecyclestage,
    HsLeadStatus,
    // Calls
    HsCallBody,
    HsCallCalleeObjectId,
    HsCallCalleeObjectTypeId,
    HsCallDirection,
    HsCallDisposition,
    HsCallFromNumber,
    HsCallStatus,
    HsCallTitle,
    HsCallToNumber,
    // Tasks
    HsTaskBody,
    HsTaskSubject,
    HsTaskStatus,
    HsTaskPriority,
    HsTaskType,
}

impl FieldName {
    pub const ALL: [FieldName; 29] = [
        FieldName::HsObjectId,
        FieldName::HubspotOwnerId,
        FieldName::HsTimestamp,
        FieldName::Email,
        FieldName::Firstname,
        FieldName::Lastname,
        FieldName::Phone,
        FieldName::City,
        FieldName::State,
        FieldName::Country,
        FieldName::Company,
        FieldName::Jobtitle,
        FieldName::Industry,
        FieldName::Lifecyclestage,
        FieldName::HsLeadStatus,
        FieldName::HsCallBody,
        FieldName::HsCallCalleeObjectId,
        FieldName::HsCallCalleeObjectTypeId,
        FieldName::HsCallDirection,
        FieldName::HsCallDisposition,
        FieldName::HsCallFromNumber,
        FieldName::HsCallStatus,
        FieldName::HsCallTitle,
        FieldName::HsCallToNumber,
        FieldName::HsTaskBody,
        FieldName::HsTaskSubject,
        FieldName::HsTaskStatus,
        FieldName::HsTaskPriority,
        FieldName::HsTaskType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::HsObjectId => "hs_object_id",
            FieldName::HubspotOwnerId => "hubspot_owner_id",
            FieldName::HsTimestamp => "hs_timestamp",
            FieldName::Email => "email",
            FieldName::Firstname => "firstname",
            FieldName::Lastname => "lastname",
            FieldName::Phone => "phone",
            FieldName::City => "city",
            FieldName::State => "state",
            FieldName::Country => "country",
            FieldName::Company => "company",
            FieldName::Jobtitle => "jobtitle",
            FieldName::Industry => "industry",
            FieldName::Lifecyclestage => "lifecyclestage",
            FieldName::HsLeadStatus => "hs_lead_status",
            FieldName::HsCallBody => "hs_call_body",
            FieldName::HsCallCalleeObjectId => "hs_call_callee_object_id",
            FieldName::HsCallCalleeObjectTypeId => "hs_call_callee_object_type_id",
            FieldName::HsCallDirection => "hs_call_direction",
            FieldName::HsCallDisposition => "hs_call_disposition",
            FieldName::HsCallFromNumber => "hs_call_from_number",
            FieldName::HsCallStatus => "hs_call_status",
            FieldName::HsCallTitle => "hs_call_title",
            FieldName::HsCallToNumber => "hs_call_to_number",
            FieldName::HsTaskBody => "hs_task_body",
            FieldName::HsTaskSubject => "hs_task_subject",
            FieldName::HsTaskStatus => "hs_task_status",
            FieldName::HsTaskPriority => "hs_task_priority",
            FieldName::HsTaskType => "hs_task_type",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == s)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `name` is one of the allow-listed HubSpot properties
pub fn is_allowed_field(name: &str) -> bool {
    FieldName::parse(name).is_some()
}

/// HubSpot-defined association type ids (`associationTypeId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationType {
    // Contact to object
    ContactToCompany,
    ContactToCompanyPrimary,
    ContactToDeal,
    ContactToTicket,
    ContactToCall,
    ContactToEmail,
    ContactToMeeting,
    ContactToNote,
    ContactToTask,
    ContactToCommunication,
    ContactToPostalMail,

    // Company to object
    CompanyToContact,
    CompanyToContactPrimary,
    CompanyToDeal,
    CompanyToDealPrimary,
    CompanyToTicket,
    CompanyToTicketPrimary,
    CompanyToCall,
    CompanyToEmail,
    CompanyToMeeting,
    CompanyToNote,
    CompanyToTask,
    CompanyToCommunication,
    CompanyToPostalMail,

    // Deal to object
    DealToContact,
    DealToCompany,
    DealToCompanyPrimary,
    DealToTicket,
    DealToCall,
    DealToEmail,
    DealToMeeting,
    DealToNote,
    DealToTask,
    DealToCommunication,
    DealToPostalMail,

    // Ticket to object
    TicketToContact,
    TicketToCompany,
    TicketToCompanyPrimary,
    TicketToDeal,
    TicketToCall,
    TicketToEmail,
    TicketToMeeting,
    TicketToNote,
    TicketToTask,
    TicketToCommunication,
    TicketToPostalMail,
}

impl AssociationType {
    pub fn id(&self) -> i32 {
        match self {
            AssociationType::ContactToCompany => 279,
            AssociationType::ContactToCompanyPrimary => 1,
            AssociationType::ContactToDeal => 4,
            AssociationType::ContactToTicket => 15,
            AssociationType::ContactToCall => 193,
            AssociationType::ContactToEmail => 197,
            AssociationType::ContactToMeeting => 199,
            AssociationType::ContactToNote => 201,
            AssociationType::ContactToTask => 203,
            AssociationType::ContactToCommunication => 82,
            AssociationType::ContactToPostalMail => 454,

            AssociationType::CompanyToContact => 280,
            AssociationType::CompanyToContactPrimary => 2,
            AssociationType::CompanyToDeal => 342,
            AssociationType::CompanyToDealPrimary => 6,
            AssociationType::CompanyToTicket => 340,
            AssociationType::CompanyToTicketPrimary => 25,
            AssociationType::CompanyToCall => 181,
            AssociationType::CompanyToEmail => 185,
            AssociationType::CompanyToMeeting => 187,
            AssociationType::CompanyToNote => 189,
            AssociationType::CompanyToTask => 191,
            AssociationType::CompanyToCommunication => 88,
            AssociationType::CompanyToPostalMail => 460,

            AssociationType::DealToContact => 3,
            AssociationType::DealToCompany => 341,
            AssociationType::DealToCompanyPrimary => 5,
            AssociationType::DealToTicket => 27,
            AssociationType::DealToCall => 205,
            AssociationType::DealToEmail => 209,
            AssociationType::DealToMeeting => 211,
            AssociationType::DealToNote => 213,
            AssociationType::DealToTask => 215,
            AssociationType::DealToCommunication => 86,
            AssociationType::DealToPostalMail => 458,

            AssociationType::TicketToContact => 16,
            AssociationType::TicketToCompany => 339,
            AssociationType::TicketToCompanyPrimary => 26,
            AssociationType::TicketToDeal => 28,
            AssociationType::TicketToCall => 219,
            AssociationType::TicketToEmail => 223,
            AssociationType::TicketToMeeting => 225,
            AssociationType::TicketToNote => 227,
            AssociationType::TicketToTask => 229,
            AssociationType::TicketToCommunication => 84,
            AssociationType::TicketToPostalMail => 456,
        }
    }
}

/// CRM object types we create, keyed by HubSpot's object type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "0-1")]
    Contact,
    #[serde(rename = "0-2")]
    Company,
    #[serde(rename = "0-27")]
    Task,
    #[serde(rename = "0-48")]
    Call,
}

impl ObjectType {
    /// HubSpot object type id, e.g. `0-1` for contacts
    pub fn type_id(&self) -> &'static str {
        match self {
            ObjectType::Contact => "0-1",
            ObjectType::Company => "0-2",
            ObjectType::Task => "0-27",
            ObjectType::Call => "0-48",
        }
    }

    /// Path segment used by the CRM v3 objects API
    pub fn api_name(&self) -> &'static str {
        match self {
            ObjectType::Contact => "contacts",
            ObjectType::Company => "companies",
            ObjectType::Task => "tasks",
            ObjectType::Call => "calls",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0-1" | "contact" | "contacts" => Some(ObjectType::Contact),
            "0-2" | "company" | "companies" => Some(ObjectType::Company),
            "0-27" | "task" | "tasks" => Some(ObjectType::Task),
            "0-48" | "call" | "calls" => Some(ObjectType::Call),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

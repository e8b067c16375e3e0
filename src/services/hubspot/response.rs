use serde::Serialize;
use serde_json::Value;

use super::api::{CrmObject, Properties};
use super::error::CrmError;
use super::types::FieldName;

/// One normalized shape for both successful and failed CRM calls.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub hs_object_id: Option<String>,
    pub properties: Properties,
    pub error: Option<String>,
}

impl ApiResponse {
    /// A successful create. The object id comes from `hs_object_id` when present.
    pub fn from_object(status: u16, object: CrmObject) -> Self {
        let hs_object_id = object
            .properties
            .get(FieldName::HsObjectId.as_str())
            .and_then(value_as_id)
            .unwrap_or(object.id);
        Self {
            status,
            hs_object_id: Some(hs_object_id),
            properties: object.properties,
            error: None,
        }
    }

    pub fn from_error(err: &CrmError) -> Self {
        Self {
            status: err.status(),
            hs_object_id: err.hs_object_id().map(String::from),
            properties: Properties::new(),
            error: Some(err.message()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn props_if_ok(&self) -> Option<&Properties> {
        if self.is_success() {
            Some(&self.properties)
        } else {
            None
        }
    }

    /// The error message, otherwise the returned properties
    pub fn task_response(&self) -> Value {
        match &self.error {
            Some(error) if !error.is_empty() => Value::String(error.clone()),
            _ => Value::Object(self.properties.clone()),
        }
    }
}

impl From<Result<ApiResponse, CrmError>> for ApiResponse {
    fn from(result: Result<ApiResponse, CrmError>) -> Self {
        result.unwrap_or_else(|err| ApiResponse::from_error(&err))
    }
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

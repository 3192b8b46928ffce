//! Remote entities returned by a `RemoteClient`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{RemoteError, RemoteResult};
use crate::value::FieldValue;

/// An entity from the remote resource API, held as its JSON attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntity {
    /// Remote entity type, e.g. `Profile`
    pub resource: String,
    pub attributes: Map<String, JsonValue>,
}

impl RemoteEntity {
    pub fn new(resource: impl Into<String>, attributes: Map<String, JsonValue>) -> Self {
        Self {
            resource: resource.into(),
            attributes,
        }
    }

    /// Build an entity from a decoded JSON object
    pub fn from_json(resource: impl Into<String>, value: JsonValue) -> RemoteResult<Self> {
        let resource = resource.into();
        match value {
            JsonValue::Object(attributes) => Ok(Self::new(resource, attributes)),
            other => Err(RemoteError::decode(format!(
                "expected a JSON object for '{}', got {}",
                resource,
                json_kind(&other)
            ))),
        }
    }

    /// Raw attribute access
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.attributes.get(name)
    }

    /// Read an attribute as a correlation value
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.attributes.get(name).and_then(FieldValue::from_json)
    }

    /// Decode the attributes into a typed struct
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(self.attributes.clone()))
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

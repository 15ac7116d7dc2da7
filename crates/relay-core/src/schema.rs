//! Tool descriptions as advertised by `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool definition from an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<InputSchema>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_input_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Declared parameter count, zero when no schema was advertised.
    pub fn parameter_count(&self) -> usize {
        self.input_schema
            .as_ref()
            .map(|s| s.properties.len())
            .unwrap_or(0)
    }
}

/// The subset of JSON Schema used for argument binding.
///
/// `properties` keeps the server's declaration order. Members this crate
/// does not interpret are kept in `extra` so a stored schema round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputSchema {
    pub fn object() -> Self {
        Self {
            schema_type: Some("object".to_string()),
            ..Default::default()
        }
    }

    /// Builder used mostly by tests and fixtures.
    pub fn with_property(mut self, name: impl Into<String>, property: Value) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Properties in declaration order.
    pub fn property_list(&self) -> impl Iterator<Item = PropertySchema<'_>> {
        self.properties
            .iter()
            .map(|(name, raw)| PropertySchema { name, raw })
    }

    pub fn property(&self, name: &str) -> Option<PropertySchema<'_>> {
        self.property_list().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Borrowed view over one entry of `properties`.
#[derive(Debug, Clone, Copy)]
pub struct PropertySchema<'a> {
    pub name: &'a str,
    pub raw: &'a Value,
}

impl<'a> PropertySchema<'a> {
    /// The declared `type` when it is a single string.
    pub fn kind(&self) -> Option<&'a str> {
        self.raw.get("type").and_then(Value::as_str)
    }

    /// True when the property carries no `type` member at all.
    pub fn is_untyped(&self) -> bool {
        matches!(self.raw.get("type"), None | Some(Value::Null))
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Some("string")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.raw.get("description").and_then(Value::as_str)
    }

    pub fn enum_values(&self) -> Option<&'a Vec<Value>> {
        self.raw.get("enum").and_then(Value::as_array)
    }
}

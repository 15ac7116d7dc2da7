//! Where replies go and where forms are filled in.

use async_trait::async_trait;
use relay_args::FieldValues;
use relay_core::{InputSchema, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    /// One of a fixed set of values.
    Select(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: Option<String>,
}

/// A form asking the user for a tool's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub server: String,
    pub tool: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormRequest {
    /// One field per declared property, in declaration order.
    pub fn for_schema(
        server: impl Into<String>,
        tool: impl Into<String>,
        description: Option<String>,
        schema: &InputSchema,
    ) -> Self {
        let fields = schema
            .property_list()
            .map(|property| {
                let kind = match (property.enum_values(), property.kind()) {
                    (Some(values), _) => FieldKind::Select(values.iter().map(display_value).collect()),
                    (None, Some("number" | "integer" | "float")) => FieldKind::Number,
                    _ => FieldKind::Text,
                };
                FormField {
                    name: property.name.to_string(),
                    kind,
                    required: schema.is_required(property.name),
                    description: property.description().map(str::to_string),
                }
            })
            .collect();

        Self {
            server: server.into(),
            tool: tool.into(),
            description,
            fields,
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait ChatSurface: Send + Sync {
    async fn say(&self, text: &str) -> Result<()>;

    /// Show `form` and wait for it. `None` means the user dismissed it.
    async fn request_form(&self, form: FormRequest) -> Result<Option<FieldValues>>;
}

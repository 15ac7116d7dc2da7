//! File-upload parameters cannot be relayed through chat text.

use relay_core::{InputSchema, PropertySchema, ToolSchema};

pub fn is_file_property(property: &PropertySchema<'_>) -> bool {
    property.name == "file"
        || property.kind() == Some("file")
        || (property.is_untyped() && property.name.to_lowercase().contains("file"))
}

pub fn has_file_field(schema: &InputSchema) -> bool {
    schema.property_list().any(|p| is_file_property(&p))
}

/// A tool without an input schema has no file field.
pub fn tool_has_file_field(tool: &ToolSchema) -> bool {
    tool.input_schema.as_ref().map(has_file_field).unwrap_or(false)
}

pub mod add;
pub mod delete;
pub mod execute;
pub mod help;
pub mod list;
pub mod tool;
pub mod update;

use relay_args::tool_has_file_field;
use relay_core::{RelayError, ToolSchema, ValidationError};

/// Refuse a tool set containing a file-upload field, naming the first offender.
pub(crate) fn reject_file_fields(tools: &[ToolSchema]) -> Result<(), RelayError> {
    match tools.iter().find(|tool| tool_has_file_field(tool)) {
        Some(tool) => Err(ValidationError::FileField {
            tool: tool.name.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

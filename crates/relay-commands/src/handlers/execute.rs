use relay_args::{bind, tool_has_file_field};
use relay_core::{RelayError, Result, ToolSchema};
use relay_mcp::CallOutcome;
use tracing::{debug, info};

use crate::context::CommandContext;
use crate::parser::ParsedCommand;
use crate::surface::FormRequest;

/// `<name> [args...]`: run the server's tool with the given arguments,
/// asking for a form when they are not enough.
pub async fn handle(ctx: &CommandContext, cmd: &ParsedCommand) -> Result<()> {
    let name = cmd.name();
    let server = ctx.require_server(name).await?;
    let tool = runnable_tool(&server.tools).cloned().ok_or_else(|| {
        RelayError::NotFound(format!(
            "MCP server '{}' has no tool that can run from chat. Try `update {}`.",
            name, name
        ))
    })?;

    let schema = tool.input_schema.as_ref();
    let mut binding = bind(&cmd.args, schema);
    if !binding.ignored.is_empty() {
        debug!("'{}' ignored arguments: {:?}", tool.name, binding.ignored);
    }

    let wants_form =
        (cmd.args.is_empty() && tool.parameter_count() > 0) || !binding.is_complete();
    if let Some(schema) = schema.filter(|_| wants_form) {
        let form = FormRequest::for_schema(&server.name, &tool.name, tool.description.clone(), schema);
        match ctx.surface.request_form(form).await? {
            Some(fields) => binding.merge_fields(&fields, Some(schema)),
            None => debug!("Form for '{}' was dismissed", tool.name),
        }
    }
    let arguments = binding.require_complete()?;
    let session = ctx.open_session(&server.endpoint).await?;

    ctx.reply(&format!("Running '{}' on MCP server '{}'...", tool.name, server.name))
        .await?;
    info!("Executing '{}' on '{}'", tool.name, server.name);

    let outcome = session.call_tool(&tool.name, arguments).await?.collect().await;
    ctx.reply(&render(outcome)).await
}

/// The first tool that does not need a file upload.
fn runnable_tool(tools: &[ToolSchema]) -> Option<&ToolSchema> {
    tools.iter().find(|tool| !tool_has_file_field(tool))
}

fn render(outcome: CallOutcome) -> String {
    match outcome.error {
        Some(error) => format!("Execution failed:\n{}", error),
        None if !outcome.text.is_empty() => outcome.text,
        None => "Finished, but the result was empty.".to_string(),
    }
}

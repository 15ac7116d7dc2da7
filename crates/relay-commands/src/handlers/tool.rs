use relay_core::{Result, ToolSchema};

use crate::context::CommandContext;
use crate::parser::ParsedCommand;

/// `tool <name>`: live tool listing with parameters.
pub async fn handle(ctx: &CommandContext, cmd: &ParsedCommand) -> Result<()> {
    let server = ctx.require_server(cmd.name()).await?;
    let tools = ctx.discover_tools(&server.endpoint).await?;

    if tools.is_empty() {
        return ctx
            .reply(&format!("MCP server '{}' has no tools.", server.name))
            .await;
    }

    let listing: Vec<String> = tools.iter().map(describe).collect();
    ctx.reply(&format!(
        "Tools on MCP server '{}':\n\n{}",
        server.name,
        listing.join("\n\n")
    ))
    .await
}

fn describe(tool: &ToolSchema) -> String {
    let params: Vec<String> = tool
        .input_schema
        .iter()
        .flat_map(|schema| {
            schema.property_list().map(move |p| {
                format!(
                    "  - {} ({}, {}): {}",
                    p.name,
                    p.kind().unwrap_or("any"),
                    if schema.is_required(p.name) { "required" } else { "optional" },
                    p.description().unwrap_or_default()
                )
            })
        })
        .collect();

    let params = if params.is_empty() {
        "  No parameters".to_string()
    } else {
        params.join("\n")
    };

    format!(
        "*{}*\n{}\nParameters:\n{}",
        tool.name,
        tool.description.as_deref().unwrap_or("No description"),
        params
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::InputSchema;
    use serde_json::json;

    #[test]
    fn test_describe_tool() {
        let tool = ToolSchema::new("search")
            .with_description("Search the docs")
            .with_input_schema(
                InputSchema::object()
                    .with_property("query", json!({"type": "string", "description": "Terms"}))
                    .with_property("raw", json!({}))
                    .with_required(["query"]),
            );

        assert_eq!(
            describe(&tool),
            "*search*\nSearch the docs\nParameters:\n  - query (string, required): Terms\n  - raw (any, optional): "
        );

        assert_eq!(
            describe(&ToolSchema::new("ping")),
            "*ping*\nNo description\nParameters:\n  No parameters"
        );
    }
}

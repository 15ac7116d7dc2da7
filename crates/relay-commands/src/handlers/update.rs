use relay_core::Result;
use tracing::info;

use super::reject_file_fields;
use crate::context::CommandContext;
use crate::parser::ParsedCommand;

/// `update <name>`: rediscover the server's tools and report what changed.
pub async fn handle(ctx: &CommandContext, cmd: &ParsedCommand) -> Result<()> {
    let name = cmd.name();
    let server = ctx.require_server(name).await?;

    ctx.reply(&format!("Refreshing tools for MCP server '{}'...", name))
        .await?;

    let tools = ctx.discover_tools(&server.endpoint).await?;
    reject_file_fields(&tools)?;

    let updated = ctx.store.replace_tools(server.id, tools).await?;
    let diff = ToolDiff::between(&server.tool_names(), &updated.tool_names());
    info!(
        "Updated server '{}': {} added, {} removed",
        name,
        diff.added.len(),
        diff.removed.len()
    );

    ctx.reply(&diff.report(name, server.tools.len(), updated.tools.len()))
        .await
}

#[derive(Debug, Default, PartialEq)]
pub struct ToolDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ToolDiff {
    pub fn between(old: &[&str], new: &[&str]) -> Self {
        Self {
            added: new.iter().filter(|n| !old.contains(*n)).map(|n| n.to_string()).collect(),
            removed: old.iter().filter(|n| !new.contains(*n)).map(|n| n.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn report(&self, server: &str, old_count: usize, new_count: usize) -> String {
        let mut text = format!(
            "Updated tools for MCP server '{}'.\nTools: {} → {}\n",
            server, old_count, new_count
        );
        if !self.added.is_empty() {
            text.push_str(&format!("\nAdded tools:\n{}", bullets(&self.added)));
        }
        if !self.removed.is_empty() {
            text.push_str(&format!("\nRemoved tools:\n{}", bullets(&self.removed)));
        }
        if self.is_empty() {
            text.push_str("\nNo changes.");
        }
        text
    }
}

fn bullets(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("• {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

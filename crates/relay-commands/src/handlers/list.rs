use relay_core::Result;
use relay_store::ServerRecord;

use crate::context::CommandContext;
use crate::parser::ParsedCommand;

const SUMMARY_CHARS: usize = 60;

/// `list`: registered servers, newest first.
pub async fn handle(ctx: &CommandContext, _cmd: &ParsedCommand) -> Result<()> {
    let servers = ctx.store.list_servers().await?;
    if servers.is_empty() {
        return ctx.reply("No MCP servers are registered.").await;
    }

    let lines: Vec<String> = servers
        .iter()
        .map(|server| match summary(server) {
            Some(summary) => format!("• {} - {}", server.name, summary),
            None => format!("• {}", server.name),
        })
        .collect();

    ctx.reply(&format!("Registered MCP servers:\n{}", lines.join("\n")))
        .await
}

/// The first non-empty tool description, cut to a line's width.
fn summary(server: &ServerRecord) -> Option<String> {
    let description = server
        .tools
        .iter()
        .filter_map(|tool| tool.description.as_deref())
        .map(str::trim)
        .find(|d| !d.is_empty())?;

    if description.chars().count() > SUMMARY_CHARS {
        let cut: String = description.chars().take(SUMMARY_CHARS).collect();
        Some(format!("{}...", cut))
    } else {
        Some(description.to_string())
    }
}

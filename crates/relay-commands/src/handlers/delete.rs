use relay_core::Result;
use tracing::info;

use crate::context::CommandContext;
use crate::parser::ParsedCommand;

/// `delete <name>`: forget a server and its tools.
pub async fn handle(ctx: &CommandContext, cmd: &ParsedCommand) -> Result<()> {
    let name = cmd.name();
    let server = ctx.require_server(name).await?;

    ctx.store.delete_server(server.id).await?;
    info!("Deleted server '{}' ({})", name, server.id);

    ctx.reply(&format!("Deleted MCP server '{}'.", name)).await
}

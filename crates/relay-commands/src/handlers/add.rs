use relay_core::{Result, ValidationError};
use tracing::{info, warn};
use url::Url;

use super::reject_file_fields;
use crate::context::CommandContext;
use crate::parser::ParsedCommand;
use crate::reserved::is_reserved;

/// `add <name> <url>`: discover the server's tools and register it.
pub async fn handle(ctx: &CommandContext, cmd: &ParsedCommand) -> Result<()> {
    let name = cmd.name();
    let endpoint = cmd.url.as_deref().unwrap_or_default();

    if is_reserved(name) {
        return Err(ValidationError::ReservedName(name.to_string()).into());
    }
    validate_endpoint(endpoint)?;
    if ctx.store.find_server_by_name(name).await?.is_some() {
        return Err(ValidationError::DuplicateServer(name.to_string()).into());
    }

    let tools = ctx.discover_tools(endpoint).await?;
    reject_file_fields(&tools)?;

    let server = ctx.store.create_server(name, endpoint).await?;
    let server = match ctx.store.replace_tools(server.id, tools).await {
        Ok(server) => server,
        Err(e) => {
            if let Err(rollback) = ctx.store.delete_server(server.id).await {
                warn!("Failed to roll back server '{}': {}", name, rollback);
            }
            return Err(e);
        }
    };

    info!("Added server '{}' with {} tools", name, server.tools.len());
    ctx.reply(&format!(
        "Registered MCP server '{}'.\nTools: {}",
        name,
        server.tools.len()
    ))
    .await
}

/// Absolute `http`/`https` URL with a host.
pub fn validate_endpoint(raw: &str) -> std::result::Result<Url, ValidationError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(ValidationError::InvalidEndpoint(raw.to_string())),
    }
}

use relay_core::{RelayError, Result, ToolSchema};
use relay_mcp::{ConnectionConfig, McpSession, Transport, DEFAULT_CALL_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT};
use relay_store::{ServerRecord, ServerStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::surface::ChatSurface;

/// Per-process settings applied to every session a command opens.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub identity: Option<String>,
    pub client_name: String,
    pub client_version: String,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            identity: None,
            client_name: "mcp-relay".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Everything a handler needs. Cloning shares the underlying handles.
#[derive(Clone)]
pub struct CommandContext {
    pub store: Arc<dyn ServerStore>,
    pub transport: Arc<dyn Transport>,
    pub surface: Arc<dyn ChatSurface>,
    pub settings: SessionSettings,
}

impl CommandContext {
    pub fn new(
        store: Arc<dyn ServerStore>,
        transport: Arc<dyn Transport>,
        surface: Arc<dyn ChatSurface>,
    ) -> Self {
        Self {
            store,
            transport,
            surface,
            settings: SessionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn connection(&self, endpoint: &str) -> ConnectionConfig {
        let config = ConnectionConfig::new(endpoint)
            .with_handshake_timeout(self.settings.handshake_timeout)
            .with_call_timeout(self.settings.call_timeout);
        match &self.settings.identity {
            Some(identity) => config.with_identity(identity.clone()),
            None => config,
        }
    }

    /// Open a session against `endpoint` and complete the handshake.
    pub async fn open_session(&self, endpoint: &str) -> Result<McpSession> {
        let mut session = McpSession::new(self.connection(endpoint), Arc::clone(&self.transport));
        session
            .initialize(&self.settings.client_name, &self.settings.client_version)
            .await?;
        Ok(session)
    }

    /// Handshake plus `tools/list`, with a fresh session.
    pub async fn discover_tools(&self, endpoint: &str) -> Result<Vec<ToolSchema>> {
        let session = self.open_session(endpoint).await?;
        let tools = session.list_tools().await?;
        debug!("{} advertises {} tools", endpoint, tools.len());
        Ok(tools)
    }

    pub async fn reply(&self, text: &str) -> Result<()> {
        self.surface.say(text).await
    }

    /// The registered server called `name`, or a `NotFound` error.
    pub async fn require_server(&self, name: &str) -> Result<ServerRecord> {
        self.store
            .find_server_by_name(name)
            .await?
            .ok_or_else(|| {
                RelayError::NotFound(format!(
                    "MCP server '{}' not found. Use `list` to see registered servers.",
                    name
                ))
            })
    }
}

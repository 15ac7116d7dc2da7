//! In-memory index shared by every store backend.

use chrono::Utc;
use relay_core::{RelayError, Result, ToolSchema, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::ServerRecord;

pub(crate) const FORMAT_VERSION: u32 = 1;

/// On-disk document of [`crate::JsonFileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Registry {
    #[serde(default = "format_version")]
    pub version: u32,
    #[serde(default)]
    pub servers: Vec<ServerRecord>,
    #[serde(skip)]
    pub closed: bool,
}

fn format_version() -> u32 {
    FORMAT_VERSION
}

impl Registry {
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            ..Default::default()
        }
    }

    pub fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(RelayError::store("store has been closed"));
        }
        Ok(())
    }

    pub fn by_name(&self, name: &str) -> Option<&ServerRecord> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn by_id(&self, id: Uuid) -> Option<&ServerRecord> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<ServerRecord> {
        let mut servers = self.servers.clone();
        servers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
        servers
    }

    pub fn create(&mut self, name: &str, endpoint: &str) -> Result<ServerRecord> {
        if self.by_name(name).is_some() {
            return Err(ValidationError::DuplicateServer(name.to_string()).into());
        }
        let record = ServerRecord::new(name, endpoint);
        self.servers.push(record.clone());
        Ok(record)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.servers.len();
        self.servers.retain(|s| s.id != id);
        self.servers.len() != before
    }

    pub fn replace_tools(&mut self, id: Uuid, tools: Vec<ToolSchema>) -> Result<ServerRecord> {
        let record = self
            .servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RelayError::NotFound(format!("no server with id {}", id)))?;
        record.tools = tools;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

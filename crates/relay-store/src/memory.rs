use async_trait::async_trait;
use relay_core::{Result, ToolSchema};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::record::ServerRecord;
use crate::registry::Registry;
use crate::ServerStore;

/// Process-local store, lost on exit.
#[derive(Debug)]
pub struct MemoryStore {
    registry: RwLock<Registry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerStore for MemoryStore {
    async fn find_server_by_name(&self, name: &str) -> Result<Option<ServerRecord>> {
        let registry = self.registry.read().await;
        registry.ensure_open()?;
        Ok(registry.by_name(name).cloned())
    }

    async fn find_server_by_id(&self, id: Uuid) -> Result<Option<ServerRecord>> {
        let registry = self.registry.read().await;
        registry.ensure_open()?;
        Ok(registry.by_id(id).cloned())
    }

    async fn list_servers(&self) -> Result<Vec<ServerRecord>> {
        let registry = self.registry.read().await;
        registry.ensure_open()?;
        Ok(registry.list())
    }

    async fn create_server(&self, name: &str, endpoint: &str) -> Result<ServerRecord> {
        let mut registry = self.registry.write().await;
        registry.ensure_open()?;
        registry.create(name, endpoint)
    }

    async fn delete_server(&self, id: Uuid) -> Result<bool> {
        let mut registry = self.registry.write().await;
        registry.ensure_open()?;
        Ok(registry.delete(id))
    }

    async fn replace_tools(&self, server_id: Uuid, tools: Vec<ToolSchema>) -> Result<ServerRecord> {
        let mut registry = self.registry.write().await;
        registry.ensure_open()?;
        registry.replace_tools(server_id, tools)
    }

    async fn close(&self) -> Result<()> {
        self.registry.write().await.closed = true;
        Ok(())
    }
}

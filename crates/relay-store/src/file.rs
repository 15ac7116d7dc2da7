use async_trait::async_trait;
use relay_core::{RelayError, Result, ToolSchema};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::record::ServerRecord;
use crate::registry::{Registry, FORMAT_VERSION};
use crate::ServerStore;

/// Single-document JSON store.
///
/// The document is read once at [`open`](Self::open); every mutation is
/// written through by writing a sibling temp file and renaming it over the
/// original, so a crash never leaves a truncated document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    registry: RwLock<Registry>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let registry = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let registry: Registry = serde_json::from_str(&json).map_err(|e| {
                RelayError::store(format!("failed to read {}: {}", path.display(), e))
            })?;
            if registry.version > FORMAT_VERSION {
                return Err(RelayError::store(format!(
                    "{} was written by a newer version (format {})",
                    path.display(),
                    registry.version
                )));
            }
            registry
        } else {
            Registry::new()
        };

        info!(
            "Opened server store at {:?} ({} servers)",
            path,
            registry.servers.len()
        );
        Ok(Self {
            path,
            registry: RwLock::new(registry),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, registry: &Registry) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(registry)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Saved {} servers to {:?}", registry.servers.len(), self.path);
        Ok(())
    }

    /// Apply `change` and write the result through. On a failed write the
    /// in-memory document is restored.
    async fn mutate<T>(&self, change: impl FnOnce(&mut Registry) -> Result<T>) -> Result<T> {
        let mut registry = self.registry.write().await;
        registry.ensure_open()?;

        let snapshot = registry.servers.clone();
        let value = change(&mut *registry)?;
        if let Err(e) = self.persist(&*registry) {
            registry.servers = snapshot;
            return Err(e);
        }
        Ok(value)
    }
}

#[async_trait]
impl ServerStore for JsonFileStore {
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
        let record = self.mutate(|r| r.create(name, endpoint)).await?;
        info!("Registered server '{}' ({})", record.name, record.id);
        Ok(record)
    }

    async fn delete_server(&self, id: Uuid) -> Result<bool> {
        self.mutate(|r| Ok(r.delete(id))).await
    }

    async fn replace_tools(&self, server_id: Uuid, tools: Vec<ToolSchema>) -> Result<ServerRecord> {
        self.mutate(|r| r.replace_tools(server_id, tools)).await
    }

    async fn close(&self) -> Result<()> {
        let mut registry = self.registry.write().await;
        if !registry.closed {
            registry.closed = true;
            debug!("Closed server store at {:?}", self.path);
        }
        Ok(())
    }
}

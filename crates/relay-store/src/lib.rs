//! Registered servers and their tools.
//!
//! The store handle is opened once at process start, passed to every command
//! by reference, and released with [`ServerStore::close`] at shutdown.

use async_trait::async_trait;
use relay_core::{Result, ToolSchema};
use uuid::Uuid;

pub mod file;
pub mod memory;
pub mod record;
mod registry;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::ServerRecord;

#[async_trait]
pub trait ServerStore: Send + Sync {
    async fn find_server_by_name(&self, name: &str) -> Result<Option<ServerRecord>>;

    async fn find_server_by_id(&self, id: Uuid) -> Result<Option<ServerRecord>>;

    /// Every registered server, newest first.
    async fn list_servers(&self) -> Result<Vec<ServerRecord>>;

    /// Register a server with no tools. Fails with
    /// `ValidationError::DuplicateServer` when the name is taken.
    async fn create_server(&self, name: &str, endpoint: &str) -> Result<ServerRecord>;

    /// Remove a server and its tools. Returns false if it did not exist.
    async fn delete_server(&self, id: Uuid) -> Result<bool>;

    /// Replace the server's tool list wholesale.
    async fn replace_tools(&self, server_id: Uuid, tools: Vec<ToolSchema>) -> Result<ServerRecord>;

    async fn close(&self) -> Result<()>;
}

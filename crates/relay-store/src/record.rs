use chrono::{DateTime, Utc};
use relay_core::ToolSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered MCP server and the tools last discovered on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
}

impl ServerRecord {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            endpoint: endpoint.into(),
            created_at: now,
            updated_at: now,
            tools: Vec::new(),
        }
    }

    pub fn tool(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

use relay_core::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod env_substitution;

pub use env_substitution::substitute_env_vars;

/// Overrides both timeouts, in milliseconds.
pub const TIMEOUT_ENV: &str = "MCP_TIMEOUT";
/// Overrides the directory holding the config file and the default store.
pub const HOME_ENV: &str = "MCP_RELAY_HOME";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Caller identity forwarded to MCP servers as `params.user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

/// Sent as `clientInfo` in `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_client_name")]
    pub name: String,
    #[serde(default = "default_client_version")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_handshake_ms")]
    pub handshake_ms: u64,
    #[serde(default = "default_call_ms")]
    pub call_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl RelayConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config = Self::parse(yaml)?;
        config.apply_timeout_override(env::var(TIMEOUT_ENV).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from [`default_config_path`](Self::default_config_path)
    /// when none is given. Only a missing default file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(path),
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Self::from_yaml(&path)
                } else {
                    debug!("No config file at {:?}, using defaults", path);
                    Self::from_yaml_str("{}")
                }
            }
        }
    }

    fn parse(yaml: &str) -> Result<Self> {
        // An empty document is an empty mapping.
        let mut value: serde_json::Value = if yaml.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| RelayError::Config(format!("Failed to parse YAML: {}", e)))?
        };
        if value.is_null() {
            value = serde_json::Value::Object(Default::default());
        }

        substitute_env_vars(&mut value)?;

        serde_json::from_value(value)
            .map_err(|e| RelayError::Config(format!("Invalid configuration: {}", e)))
    }

    fn apply_timeout_override(&mut self, raw: Option<&str>) -> Result<()> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(());
        };
        let ms: u64 = raw
            .parse()
            .map_err(|_| RelayError::Config(format!("{} must be milliseconds, got '{}'", TIMEOUT_ENV, raw)))?;
        self.timeouts.handshake_ms = ms;
        self.timeouts.call_ms = ms;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.client.name.trim().is_empty() {
            return Err(RelayError::Config("Client name cannot be empty".into()));
        }
        if self.timeouts.handshake_ms == 0 || self.timeouts.call_ms == 0 {
            return Err(RelayError::Config("Timeouts must be greater than zero".into()));
        }
        if self.identity.as_deref().is_some_and(|i| i.trim().is_empty()) {
            return Err(RelayError::Config("Identity cannot be blank".into()));
        }
        Ok(())
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.handshake_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.call_ms)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| relay_home().join("servers.json"))
    }

    pub fn default_config_path() -> PathBuf {
        relay_home().join("config.yaml")
    }
}

/// `$MCP_RELAY_HOME`, else `~/.mcp-relay`.
pub fn relay_home() -> PathBuf {
    env::var(HOME_ENV)
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|home| home.join(".mcp-relay")))
        .unwrap_or_else(|| PathBuf::from("./.mcp-relay"))
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            version: default_client_version(),
        }
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            handshake_ms: default_handshake_ms(),
            call_ms: default_call_ms(),
        }
    }
}

fn default_client_name() -> String { "mcp-relay".to_string() }
fn default_client_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_handshake_ms() -> u64 { 30_000 }
fn default_call_ms() -> u64 { 300_000 }

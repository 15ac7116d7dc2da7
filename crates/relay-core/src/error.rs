use std::time::Duration;
use thiserror::Error;

/// JSON-RPC level failures reported by the remote server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// The server does not know the calling user yet.
    #[error("User not found. Please call initialize() first.")]
    UserNotFound,

    #[error("MCP error: {message}")]
    Rpc { code: Option<i64>, message: String },

    #[error("invalid response from MCP server: {0}")]
    InvalidResponse(String),
}

impl ProtocolError {
    /// Build from the `error` member of a JSON-RPC payload.
    pub fn from_rpc_error(error: &serde_json::Value) -> Self {
        let message = rpc_error_message(error);
        if message == "User not found" {
            return ProtocolError::UserNotFound;
        }
        ProtocolError::Rpc {
            code: error.get("code").and_then(serde_json::Value::as_i64),
            message,
        }
    }
}

/// Human-readable message of a JSON-RPC error member: its `message` string,
/// the member itself when it is a bare string, or its JSON text.
pub fn rpc_error_message(error: &serde_json::Value) -> String {
    if let Some(message) = error.get("message").and_then(serde_json::Value::as_str) {
        return message.to_string();
    }
    match error.as_str() {
        Some(message) => message.to_string(),
        None => error.to_string(),
    }
}

/// Argument and registration checks that run before any network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("tool '{tool}' declares a file field; file uploads are not supported")]
    FileField { tool: String },

    #[error("'{0}' is a reserved command name, pick another server name")]
    ReservedName(String),

    #[error("endpoint must be an http:// or https:// URL: {0}")]
    InvalidEndpoint(String),

    #[error("a server named '{0}' is already registered")]
    DuplicateServer(String),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("session not initialized - call initialize() first")]
    NotInitialized,

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Network failure, non-success status or timeout.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RelayError::Transport(_) | RelayError::HttpStatus { .. } | RelayError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

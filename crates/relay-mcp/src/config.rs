//! Per-call connection settings.

use std::time::Duration;

/// Handshake operations (`initialize`, `tools/list`) fail fast.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote workflows may run for minutes.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// The three JSON-RPC methods a session issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    ListTools,
    CallTool,
}

impl Operation {
    pub fn method(&self) -> &'static str {
        match self {
            Operation::Initialize => "initialize",
            Operation::ListTools => "tools/list",
            Operation::CallTool => "tools/call",
        }
    }
}

/// Immutable settings for one client instance, scoped to one user-initiated call.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
    /// Caller identity, forwarded as `params.user`.
    pub identity: Option<String>,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            identity: None,
        }
    }

    /// Use one timeout for every operation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self.call_timeout = timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn timeout_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Initialize | Operation::ListTools => self.handshake_timeout,
            Operation::CallTool => self.call_timeout,
        }
    }
}

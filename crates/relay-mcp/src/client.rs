//! MCP client session

use futures::StreamExt;
use relay_core::{BoundArguments, ExecutionEvent, ProtocolError, RelayError, Result, ToolSchema};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, RwLock};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, Operation};
use crate::decode::PayloadDecoder;
use crate::normalize::normalize;
use crate::stream::ExecutionStream;
use crate::transport::Transport;
use crate::types::{ClientInfo, InitializeParams, InitializeResult, JsonRpcRequest, ListToolsResult, ToolCallParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Executing,
    Completed,
    Failed,
}

/// One client instance, scoped to a single user-initiated interaction.
///
/// Every operation is an independent POST to the configured endpoint; no
/// connection state is kept between them. `initialize` must succeed before
/// `list_tools` or `call_tool` are issued.
#[derive(Debug)]
pub struct McpSession {
    config: ConnectionConfig,
    transport: Arc<dyn Transport>,
    request_id: AtomicU64,
    state: Arc<RwLock<SessionState>>,
    server: Option<InitializeResult>,
}

impl McpSession {
    pub fn new(config: ConnectionConfig, transport: Arc<dyn Transport>) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(1);

        Self {
            config,
            transport,
            request_id: AtomicU64::new(seed),
            state: Arc::new(RwLock::new(SessionState::Uninitialized)),
            server: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Result of the last successful `initialize`, when the server sent one.
    pub fn server_info(&self) -> Option<&InitializeResult> {
        self.server.as_ref()
    }

    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn encode_request(&self, operation: Operation, mut params: Value) -> Result<String> {
        if let (Some(identity), Some(map)) = (&self.config.identity, params.as_object_mut()) {
            map.insert("user".to_string(), Value::String(identity.clone()));
        }
        let id = self.next_request_id();
        debug!("Sending {} request (id: {})", operation.method(), id);
        let request = JsonRpcRequest::new(id, operation.method(), params);
        Ok(serde_json::to_string(&request)?)
    }

    async fn ensure_initialized(&self) -> Result<()> {
        if self.state().await == SessionState::Uninitialized {
            return Err(RelayError::NotInitialized);
        }
        Ok(())
    }

    /// Perform the `initialize` handshake.
    pub async fn initialize(
        &mut self,
        client_name: &str,
        client_version: &str,
    ) -> Result<Option<InitializeResult>> {
        info!("Initializing MCP session with {}", self.config.endpoint);

        let params = InitializeParams::new(ClientInfo {
            name: client_name.to_string(),
            version: client_version.to_string(),
        });
        let body = self.encode_request(Operation::Initialize, serde_json::to_value(params)?)?;
        let response = self.exchange(Operation::Initialize, body).await?;

        let result = response
            .and_then(|payload| payload.get("result").cloned())
            .and_then(|result| match serde_json::from_value::<InitializeResult>(result) {
                Ok(result) => Some(result),
                Err(e) => {
                    debug!("Ignoring unrecognised initialize result: {}", e);
                    None
                }
            });

        if let Some(server) = result.as_ref().and_then(|r| r.server_info.as_ref()) {
            info!("Connected to MCP server: {} v{}", server.name, server.version);
        }

        *self.state.write().await = SessionState::Ready;
        self.server = result.clone();
        Ok(result)
    }

    /// Discover the server's tools. A server without tools yields an empty list.
    pub async fn list_tools(&self) -> Result<Vec<ToolSchema>> {
        self.ensure_initialized().await?;

        let body = self.encode_request(Operation::ListTools, json!({}))?;
        let response = self.exchange(Operation::ListTools, body).await?;

        let result = match response.and_then(|payload| payload.get("result").cloned()) {
            Some(result) if !result.is_null() => serde_json::from_value::<ListToolsResult>(result)
                .map_err(|e| ProtocolError::InvalidResponse(format!("malformed tools/list result: {}", e)))?,
            _ => ListToolsResult::default(),
        };

        debug!("Discovered {} tools at {}", result.tools.len(), self.config.endpoint);
        Ok(result.tools)
    }

    /// Start a tool call. Events arrive on the returned stream as the server
    /// produces them.
    pub async fn call_tool(&self, name: &str, arguments: BoundArguments) -> Result<ExecutionStream> {
        self.ensure_initialized().await?;

        let params = ToolCallParams {
            name: name.to_string(),
            arguments,
        };
        let body = self.encode_request(Operation::CallTool, serde_json::to_value(params)?)?;
        info!("Calling tool '{}' at {}", name, self.config.endpoint);

        *self.state.write().await = SessionState::Executing;

        let call = PendingCall {
            transport: Arc::clone(&self.transport),
            endpoint: self.config.endpoint.clone(),
            body,
            timeout: self.config.timeout_for(Operation::CallTool),
        };
        let state = Arc::clone(&self.state);

        Ok(ExecutionStream::spawn(move |tx| call.run(tx, state)))
    }

    /// One request/response exchange for the handshake methods. Reads until
    /// the first payload carrying `result`, failing on a JSON-RPC `error`.
    async fn exchange(&self, operation: Operation, body: String) -> Result<Option<Value>> {
        let limit = self.config.timeout_for(operation);
        timeout(limit, self.read_response(operation, body, limit))
            .await
            .map_err(|_| RelayError::Timeout(limit))?
    }

    async fn read_response(&self, operation: Operation, body: String, limit: Duration) -> Result<Option<Value>> {
        let response = self.transport.post(&self.config.endpoint, body, limit).await?;

        if !response.is_success() {
            let status = response.status;
            let body = response.text().await.unwrap_or_default();
            warn!("{} failed with HTTP {}", operation.method(), status);
            return Err(RelayError::HttpStatus { status, body });
        }

        let mut decoder = PayloadDecoder::new(response.is_event_stream());
        let mut stream = response.body;
        while let Some(chunk) = stream.next().await {
            for payload in decoder.feed(&chunk?) {
                check_rpc_error(&payload)?;
                if payload.get("result").is_some() {
                    return Ok(Some(payload));
                }
            }
        }

        let document = decoder.finish().map_err(|e| {
            ProtocolError::InvalidResponse(format!("{} response is not valid JSON: {}", operation.method(), e))
        })?;
        if let Some(payload) = &document {
            check_rpc_error(payload)?;
        }
        Ok(document)
    }
}

fn check_rpc_error(payload: &Value) -> Result<()> {
    match payload.get("error") {
        Some(error) if !error.is_null() => Err(ProtocolError::from_rpc_error(error).into()),
        _ => Ok(()),
    }
}

/// Everything the producer task needs, detached from the session.
struct PendingCall {
    transport: Arc<dyn Transport>,
    endpoint: String,
    body: String,
    timeout: Duration,
}

enum Interrupted {
    Closed,
    Failed(RelayError),
}

impl From<RelayError> for Interrupted {
    fn from(e: RelayError) -> Self {
        Interrupted::Failed(e)
    }
}

impl PendingCall {
    /// Drive the call to its terminal event. The session state is settled
    /// before the terminal event is sent.
    async fn run(self, tx: mpsc::Sender<ExecutionEvent>, state: Arc<RwLock<SessionState>>) {
        if tx.send(ExecutionEvent::Start).await.is_err() {
            *state.write().await = SessionState::Failed;
            return;
        }

        let terminal = match self.pump(&tx).await {
            Ok(Some(event)) => event,
            Ok(None) => ExecutionEvent::complete(),
            Err(Interrupted::Closed) => {
                *state.write().await = SessionState::Failed;
                return;
            }
            Err(Interrupted::Failed(e)) => {
                warn!("Tool call failed: {}", e);
                ExecutionEvent::error(format!("Tool execution failed: {}", e))
            }
        };

        *state.write().await = match terminal {
            ExecutionEvent::Error { .. } => SessionState::Failed,
            _ => SessionState::Completed,
        };
        let _ = tx.send(terminal).await;
    }

    /// Forward non-terminal events and return the first terminal one, if the
    /// body produced any.
    async fn pump(&self, tx: &mpsc::Sender<ExecutionEvent>) -> std::result::Result<Option<ExecutionEvent>, Interrupted> {
        let deadline = Instant::now() + self.timeout;
        let expired = || Interrupted::Failed(RelayError::Timeout(self.timeout));

        let response = timeout_at(deadline, self.transport.post(&self.endpoint, self.body.clone(), self.timeout))
            .await
            .map_err(|_| expired())??;

        if !response.is_success() {
            let status = response.status;
            let body = timeout_at(deadline, response.text())
                .await
                .ok()
                .and_then(|text| text.ok())
                .unwrap_or_default();
            return Err(RelayError::HttpStatus { status, body }.into());
        }

        let mut decoder = PayloadDecoder::new(response.is_event_stream());
        let mut stream = response.body;
        loop {
            let chunk = match timeout_at(deadline, stream.next()).await {
                Err(_) => return Err(expired()),
                Ok(None) => break,
                Ok(Some(chunk)) => chunk?,
            };
            for payload in decoder.feed(&chunk) {
                if let Some(terminal) = forward(tx, &payload).await? {
                    return Ok(Some(terminal));
                }
            }
        }

        match decoder.finish() {
            Ok(Some(document)) => forward(tx, &document).await,
            Ok(None) => Ok(None),
            Err(e) => {
                debug!("Skipping undecodable tool call response body: {}", e);
                Ok(None)
            }
        }
    }
}

/// Normalize one payload; send it if it is not terminal, return it if it is.
async fn forward(
    tx: &mpsc::Sender<ExecutionEvent>,
    payload: &Value,
) -> std::result::Result<Option<ExecutionEvent>, Interrupted> {
    match normalize(payload) {
        Some(event) if event.is_terminal() => Ok(Some(event)),
        Some(event) => {
            tx.send(event).await.map_err(|_| Interrupted::Closed)?;
            Ok(None)
        }
        None => {
            debug!("Skipping unrecognised payload");
            Ok(None)
        }
    }
}

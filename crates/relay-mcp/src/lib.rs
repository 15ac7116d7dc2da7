//! MCP client over JSON-RPC/HTTP.
//!
//! [`McpSession`] issues `initialize`, `tools/list` and `tools/call` as
//! independent POSTs. Responses are read either as Server-Sent Events
//! ([`sse::SseReader`]) or as one JSON document, and every payload is mapped
//! onto the canonical [`relay_core::ExecutionEvent`] by [`normalize::normalize`].

pub mod client;
pub mod config;
pub mod decode;
pub mod normalize;
pub mod sse;
pub mod stream;
pub mod transport;
pub mod types;

pub use client::{McpSession, SessionState};
pub use config::{ConnectionConfig, Operation, DEFAULT_CALL_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT};
pub use normalize::{normalize, Payload};
pub use sse::{SseFrame, SseReader};
pub use stream::{CallOutcome, ExecutionStream};
pub use transport::{BodyStream, HttpResponse, HttpTransport, Transport};
pub use types::{ClientInfo, InitializeResult, ServerInfo, PROTOCOL_VERSION};

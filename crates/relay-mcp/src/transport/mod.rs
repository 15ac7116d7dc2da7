//! Transport layer for MCP communication
//!
//! A transport performs one HTTP POST per JSON-RPC request and hands back the
//! status, content type and a byte stream of the body. Framing and decoding of
//! that body happen above this layer, so tests can substitute a scripted
//! transport without touching the network.

use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;
use relay_core::Result;
use std::fmt::Debug;
use std::pin::Pin;
use std::time::Duration;

pub mod http;

pub use http::HttpTransport;

/// Response body as it arrives off the wire.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_event_stream(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/event-stream"))
            .unwrap_or(false)
    }

    /// Drain the body into a string. Used for error reporting.
    pub async fn text(self) -> Result<String> {
        let mut body = self.body;
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Transport trait for MCP communication
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// POST a serialized JSON-RPC request. `timeout` bounds the whole exchange
    /// up to and including the response headers.
    async fn post(&self, endpoint: &str, body: String, timeout: Duration) -> Result<HttpResponse>;
}

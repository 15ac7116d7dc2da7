//! reqwest-backed transport for HTTP MCP servers

use async_trait::async_trait;
use futures::StreamExt;
use relay_core::{RelayError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

use super::{HttpResponse, Transport};

/// Streamable-HTTP transport. Every request is an independent POST.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish()
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> RelayError {
    if e.is_timeout() {
        RelayError::Timeout(timeout)
    } else {
        RelayError::transport(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: String, timeout: Duration) -> Result<HttpResponse> {
        debug!("POST {} ({} bytes)", endpoint, body.len());

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!("Response status {} content-type {:?}", status, content_type);

        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| map_reqwest_error(e, timeout))
            })
            .boxed();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

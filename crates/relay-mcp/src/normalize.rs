//! Maps raw JSON-RPC and workflow-engine payloads onto [`ExecutionEvent`]s.
//!
//! Each payload is first classified into a closed set of recognised shapes
//! ([`Payload`]), checked in priority order:
//!
//! 1. a top-level JSON-RPC `error` member, which wins over everything else
//! 2. an MCP `result.content` array
//! 3. a vendor `event` discriminator
//! 4. bare `answer` / `message` / `data.text` fields
//!
//! Anything else is [`Payload::Unknown`] and produces no event.

use relay_core::error::rpc_error_message;
use relay_core::ExecutionEvent;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON-RPC `error` member.
    RpcError { message: String },
    /// MCP `result.content` text, items joined with newlines.
    ToolResult { text: String, is_error: bool },
    /// `message` / `agent_message` events.
    Message { text: String },
    /// `text-chunk` events.
    TextChunk { text: String },
    /// `node_finished` events.
    NodeFinished { text: String },
    /// `workflow_finished` / `message_end` events.
    Finished { payload: Value },
    /// `error` events.
    VendorError { message: String },
    /// Untagged payload with an `answer`, `message` or `data.text` field.
    Fallback { text: String },
    Unknown,
}

impl Payload {
    pub fn classify(value: &Value) -> Self {
        if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
            return Payload::RpcError {
                message: rpc_error_message(error),
            };
        }

        if let Some(result) = value.get("result") {
            if let Some(items) = result.get("content").and_then(Value::as_array) {
                if let Some(text) = content_text(items) {
                    let is_error = result
                        .get("isError")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    return Payload::ToolResult { text, is_error };
                }
            }
        }

        if let Some(event) = value.get("event").and_then(Value::as_str) {
            if let Some(payload) = classify_vendor_event(event, value) {
                return payload;
            }
        }

        fallback_text(value)
            .map(|text| Payload::Fallback { text })
            .unwrap_or(Payload::Unknown)
    }

    pub fn into_event(self) -> Option<ExecutionEvent> {
        match self {
            Payload::RpcError { message } | Payload::VendorError { message } => {
                Some(ExecutionEvent::Error { message })
            }
            Payload::ToolResult { text, is_error: true } => Some(ExecutionEvent::Error { message: text }),
            Payload::ToolResult { text, .. }
            | Payload::Message { text }
            | Payload::TextChunk { text }
            | Payload::NodeFinished { text }
            | Payload::Fallback { text } => Some(ExecutionEvent::Chunk { text }),
            Payload::Finished { payload } => Some(ExecutionEvent::Complete {
                payload: Some(payload),
            }),
            Payload::Unknown => None,
        }
    }
}

/// Normalize one decoded payload. `None` means the payload is skipped.
pub fn normalize(value: &Value) -> Option<ExecutionEvent> {
    Payload::classify(value).into_event()
}

fn classify_vendor_event(event: &str, value: &Value) -> Option<Payload> {
    match event {
        "message" | "agent_message" => ["answer", "message", "data"]
            .iter()
            .find_map(|field| present(value.get(*field)))
            .map(|v| Payload::Message { text: text_of(v) }),
        "text-chunk" => value
            .pointer("/data/text")
            .and_then(Value::as_str)
            .map(|text| Payload::TextChunk {
                text: text.to_string(),
            }),
        "node_finished" => node_output(value).map(|v| Payload::NodeFinished { text: text_of(v) }),
        "workflow_finished" | "message_end" => Some(Payload::Finished {
            payload: value.clone(),
        }),
        "error" => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| value.get("error").and_then(Value::as_str))
                .unwrap_or("Unknown error");
            Some(Payload::VendorError {
                message: message.to_string(),
            })
        }
        _ => None,
    }
}

fn node_output(value: &Value) -> Option<&Value> {
    let outputs = value.pointer("/data/outputs")?;
    present(outputs.get("output"))
        .or_else(|| present(outputs.get("text")))
        .or_else(|| {
            outputs
                .as_object()
                .and_then(|map| map.values().find_map(|v| present(Some(v))))
        })
}

fn fallback_text<'a>(value: &'a Value) -> Option<String> {
    let text = |v: Option<&'a Value>| present(v).and_then(Value::as_str);
    text(value.get("answer"))
        .or_else(|| text(value.get("message")))
        .or_else(|| text(value.pointer("/data/text")))
        .map(str::to_string)
}

/// Text items of an MCP content array. Each item's text may itself be a JSON
/// document wrapping the real text one level down.
fn content_text(items: &[Value]) -> Option<String> {
    let texts: Vec<String> = items
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .map(unwrap_nested_text)
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

fn unwrap_nested_text(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.get("text").and_then(Value::as_str) {
            Some(inner) => inner.to_string(),
            None => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// A field counts as present unless it is null or an empty string.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

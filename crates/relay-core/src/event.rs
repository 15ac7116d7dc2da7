//! Canonical execution events.
//!
//! Every backend vocabulary (plain MCP results, workflow-engine events) is
//! normalized into [`ExecutionEvent`]. A call stream carries at most one
//! `Start`, any number of `Chunk`s and exactly one terminal `Complete` or
//! `Error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExecutionEvent {
    Start,
    Chunk {
        text: String,
    },
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Error {
        message: String,
    },
}

impl ExecutionEvent {
    pub fn chunk(text: impl Into<String>) -> Self {
        Self::Chunk { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn complete() -> Self {
        Self::Complete { payload: None }
    }

    /// `Complete` and `Error` end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::Chunk { .. } => EventKind::Chunk,
            Self::Complete { .. } => EventKind::Complete,
            Self::Error { .. } => EventKind::Error,
        }
    }

    /// Stamp the event for collaborators that consume `{type, data?, error?, timestamp}`.
    pub fn to_record(&self) -> EventRecord {
        let (data, error) = match self {
            Self::Start => (None, None),
            Self::Chunk { text } => (Some(Value::String(text.clone())), None),
            Self::Complete { payload } => (payload.clone(), None),
            Self::Error { message } => (None, Some(message.clone())),
        };
        EventRecord {
            kind: self.kind(),
            data,
            error,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Chunk,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

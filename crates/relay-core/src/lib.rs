pub mod error;
pub mod event;
pub mod schema;

pub use error::{ProtocolError, RelayError, Result, ValidationError};
pub use event::{EventKind, EventRecord, ExecutionEvent};
pub use schema::{InputSchema, PropertySchema, ToolSchema};

/// Arguments object sent as `params.arguments` of a `tools/call` request.
pub type BoundArguments = serde_json::Map<String, serde_json::Value>;

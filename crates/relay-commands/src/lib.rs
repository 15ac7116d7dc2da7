//! Chat commands for managing and running remote MCP servers.
//!
//! A message is parsed into a [`ParsedCommand`], routed by its [`CommandKind`]
//! to a handler, and every reply goes to the [`ChatSurface`] carried in
//! the [`CommandContext`].

pub mod context;
pub mod dispatch;
pub mod handlers;
pub mod parser;
pub mod reserved;
pub mod surface;

pub use context::{CommandContext, SessionSettings};
pub use dispatch::{handler_for, render_error, Dispatcher, Handler};
pub use parser::{parse, CommandKind, ParsedCommand};
pub use reserved::{is_reserved, RESERVED_NAMES};
pub use surface::{ChatSurface, FieldKind, FormField, FormRequest};

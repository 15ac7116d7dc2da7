use relay_core::{RelayError, Result};
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

use crate::context::CommandContext;
use crate::handlers;
use crate::parser::{parse, CommandKind, ParsedCommand};

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

pub type Handler = for<'a> fn(&'a CommandContext, &'a ParsedCommand) -> HandlerFuture<'a>;

macro_rules! boxed {
    ($($name:ident => $handle:path),* $(,)?) => {
        $(
            fn $name<'a>(ctx: &'a CommandContext, cmd: &'a ParsedCommand) -> HandlerFuture<'a> {
                Box::pin($handle(ctx, cmd))
            }
        )*
    };
}

boxed! {
    run_add => handlers::add::handle,
    run_list => handlers::list::handle,
    run_tool => handlers::tool::handle,
    run_update => handlers::update::handle,
    run_delete => handlers::delete::handle,
    run_help => handlers::help::handle,
    run_execute => handlers::execute::handle,
}

static HANDLERS: [(CommandKind, Handler); 7] = [
    (CommandKind::Add, run_add),
    (CommandKind::List, run_list),
    (CommandKind::Tool, run_tool),
    (CommandKind::Update, run_update),
    (CommandKind::Delete, run_delete),
    (CommandKind::Help, run_help),
    (CommandKind::Execute, run_execute),
];

pub fn handler_for(kind: CommandKind) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, handler)| *handler)
}

/// Routes chat messages to their handlers and reports failures back to the
/// chat surface.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: CommandContext,
}

impl Dispatcher {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Handle one message. Handler failures are replied as text; only a
    /// failure of the surface itself is returned.
    pub async fn handle_message(&self, text: &str) -> Result<()> {
        match parse(text) {
            Some(cmd) => self.dispatch(&cmd).await,
            None => self.ctx.reply(&usage_for(text)).await,
        }
    }

    pub async fn dispatch(&self, cmd: &ParsedCommand) -> Result<()> {
        let handler = handler_for(cmd.kind)
            .ok_or_else(|| RelayError::NotFound(format!("no handler for '{}'", cmd.kind)))?;

        info!("Dispatching '{}' for '{}'", cmd.kind, cmd.name());
        if let Err(e) = handler(&self.ctx, cmd).await {
            warn!("Command '{}' failed: {}", cmd.kind, e);
            self.ctx.reply(&render_error(&e)).await?;
        }
        Ok(())
    }
}

/// Chat text for a handler failure. Validation and lookup failures are
/// already phrased for the user.
pub fn render_error(err: &RelayError) -> String {
    match err {
        RelayError::Validation(_) | RelayError::NotFound(_) => err.to_string(),
        other => format!("Something went wrong: {}\nPlease try again.", other),
    }
}

fn usage_for(text: &str) -> String {
    let keyword = text.split_whitespace().next().unwrap_or_default();
    match CommandKind::ALL
        .into_iter()
        .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    {
        Some(kind) => format!("Usage: `{}`", kind.usage()),
        None => handlers::help::help_text(),
    }
}

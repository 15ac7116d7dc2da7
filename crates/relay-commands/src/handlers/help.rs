use relay_core::Result;

use crate::context::CommandContext;
use crate::parser::{CommandKind, ParsedCommand};

pub async fn handle(ctx: &CommandContext, _cmd: &ParsedCommand) -> Result<()> {
    ctx.reply(&help_text()).await
}

pub fn help_text() -> String {
    let line = |kind: CommandKind, what: &str| format!("• `{}` - {}", kind.usage(), what);
    [
        "Commands:".to_string(),
        line(CommandKind::Add, "register an MCP server"),
        line(CommandKind::List, "show registered servers"),
        line(CommandKind::Tool, "show a server's tools and parameters"),
        line(CommandKind::Update, "refresh a server's tools"),
        line(CommandKind::Delete, "remove a server"),
        line(CommandKind::Execute, "run a server's tool"),
        line(CommandKind::Help, "show this message"),
    ]
    .join("\n")
}

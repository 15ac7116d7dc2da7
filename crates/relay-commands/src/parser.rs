//! Splits a chat message into a command.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Add,
    List,
    Tool,
    Update,
    Delete,
    Help,
    /// Any first word that is not a keyword names a server to run.
    Execute,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Add,
        CommandKind::List,
        CommandKind::Tool,
        CommandKind::Update,
        CommandKind::Delete,
        CommandKind::Help,
        CommandKind::Execute,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::Add => "add",
            CommandKind::List => "list",
            CommandKind::Tool => "tool",
            CommandKind::Update => "update",
            CommandKind::Delete => "delete",
            CommandKind::Help => "help",
            CommandKind::Execute => "execute",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        // `execute` is never typed; it is what an unknown word becomes.
        Self::ALL
            .into_iter()
            .filter(|kind| *kind != CommandKind::Execute)
            .find(|kind| kind.keyword() == word)
    }

    pub fn min_args(&self) -> usize {
        match self {
            CommandKind::Add => 2,
            CommandKind::Tool | CommandKind::Update | CommandKind::Delete => 1,
            CommandKind::List | CommandKind::Help | CommandKind::Execute => 0,
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Add => "add <name> <url>",
            CommandKind::List => "list",
            CommandKind::Tool => "tool <name>",
            CommandKind::Update => "update <name>",
            CommandKind::Delete => "delete <name>",
            CommandKind::Help => "help",
            CommandKind::Execute => "<name> [key=value ...] [text ...]",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub kind: CommandKind,
    /// Server name: the first argument, or the first word for `execute`.
    pub name: Option<String>,
    /// Endpoint, `add` only.
    pub url: Option<String>,
    /// Words after the keyword (after the server name for `execute`).
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Parse `text`. Returns `None` for an empty message or a keyword given too
/// few arguments.
pub fn parse(text: &str) -> Option<ParsedCommand> {
    let mut words = text.split_whitespace().map(str::to_string);
    let first = words.next()?;
    let rest: Vec<String> = words.collect();

    let Some(kind) = CommandKind::from_keyword(&first) else {
        return Some(ParsedCommand {
            kind: CommandKind::Execute,
            name: Some(first),
            url: None,
            args: rest,
        });
    };

    if rest.len() < kind.min_args() {
        return None;
    }

    let url = match kind {
        CommandKind::Add => rest.get(1).map(|raw| unwrap_link(raw).to_string()),
        _ => None,
    };

    Some(ParsedCommand {
        kind,
        name: rest.first().cloned(),
        url,
        args: rest,
    })
}

/// Chat clients send links as `<url>` or `<url|label>`.
fn unwrap_link(raw: &str) -> &str {
    match raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(inner) => inner.split('|').next().unwrap_or(inner),
        None => raw,
    }
}

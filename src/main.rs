use anyhow::Result;
use clap::{Parser, Subcommand};
use relay_commands::{CommandContext, CommandKind, Dispatcher, ParsedCommand, SessionSettings};
use relay_config::RelayConfig;
use relay_mcp::HttpTransport;
use relay_store::{JsonFileStore, ServerStore};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;

use console::ConsoleSurface;

#[derive(Parser)]
#[command(name = "mcp-relay")]
#[command(about = "Register remote MCP servers and run their tools from a chat prompt", long_about = None)]
struct Cli {
    /// Config file (default: $MCP_RELAY_HOME/config.yaml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an MCP server
    Add {
        name: String,
        url: String,
    },

    /// List registered servers
    List,

    /// Show a server's tools and their parameters
    Tool {
        name: String,
    },

    /// Rediscover a server's tools
    Update {
        name: String,
    },

    /// Remove a server
    Delete {
        name: String,
    },

    /// Run a server's tool
    Run {
        name: String,

        /// `key=value` pairs and free text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Interactive chat mode
    Chat,
}

impl Commands {
    fn into_parsed(self) -> Option<ParsedCommand> {
        let (kind, name, url, args) = match self {
            Commands::Add { name, url } => {
                (CommandKind::Add, Some(name.clone()), Some(url.clone()), vec![name, url])
            }
            Commands::List => (CommandKind::List, None, None, Vec::new()),
            Commands::Tool { name } => (CommandKind::Tool, Some(name.clone()), None, vec![name]),
            Commands::Update { name } => (CommandKind::Update, Some(name.clone()), None, vec![name]),
            Commands::Delete { name } => (CommandKind::Delete, Some(name.clone()), None, vec![name]),
            Commands::Run { name, args } => (CommandKind::Execute, Some(name), None, args),
            Commands::Chat => return None,
        };
        Some(ParsedCommand { kind, name, url, args })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = RelayConfig::load(cli.config.as_deref())?;
    let store = Arc::new(JsonFileStore::open(config.store_path())?);

    let ctx = CommandContext::new(
        store.clone(),
        Arc::new(HttpTransport::new()),
        Arc::new(ConsoleSurface),
    )
    .with_settings(session_settings(&config));
    let dispatcher = Dispatcher::new(ctx);

    let outcome = match cli.command.into_parsed() {
        Some(cmd) => dispatcher.dispatch(&cmd).await.map_err(anyhow::Error::from),
        None => interactive_chat(&dispatcher).await,
    };

    store.close().await?;
    outcome
}

fn session_settings(config: &RelayConfig) -> SessionSettings {
    SessionSettings {
        identity: config.identity.clone(),
        client_name: config.client.name.clone(),
        client_version: config.client.version.clone(),
        handshake_timeout: config.handshake_timeout(),
        call_timeout: config.call_timeout(),
    }
}

async fn interactive_chat(dispatcher: &Dispatcher) -> Result<()> {
    println!("🔌 MCP Relay Interactive Chat");
    println!("Type 'help' for commands, 'exit' or 'quit' to leave");
    println!("═══════════════════════════════════════\n");

    loop {
        print!("You> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        println!();
        dispatcher.handle_message(input).await?;
    }

    info!("Chat session ended");
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}

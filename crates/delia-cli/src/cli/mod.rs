//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use delia_core::api::{Agent, UserLevel};
use delia_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "delia")]
#[command(version)]
#[command(about = "Terminal client for the DELIA document assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Agent to talk to (documents, edsl); defaults to the config value
    #[arg(long, global = true)]
    agent: Option<Agent>,

    /// EDSL knowledge level (basic, intermediate, advanced)
    #[arg(long, global = true)]
    level: Option<UserLevel>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the interactive chat (default)
    Chat,

    /// Ask one question and print the answer
    Ask {
        /// The question (read from stdin when omitted)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Log in and store the access token
    Login {
        #[arg(short, long, env = "DELIA_USERNAME")]
        username: Option<String>,

        #[arg(long, env = "DELIA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Manage the document knowledge base
    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum DocsCommands {
    /// Show document and chunk counts
    Stats,
    /// List uploaded documents
    List,
    /// Upload documents (.pdf, .txt, .json, .xlsx)
    Upload {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete every document from the knowledge base
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    if let Some(level) = cli.level {
        config.user_level = level;
    }
    let agent = cli.agent.unwrap_or(config.default_agent);

    let Some(command) = cli.command else {
        return commands::chat::run(&config, agent).await;
    };

    match command {
        Commands::Chat => commands::chat::run(&config, agent).await,
        Commands::Ask { prompt } => commands::ask::run(&config, agent, prompt).await,
        Commands::Login { username, password } => {
            commands::auth::login(&config, username, password).await
        }
        Commands::Logout => commands::auth::logout(),
        Commands::Docs { command } => match command {
            DocsCommands::Stats => commands::docs::stats(&config).await,
            DocsCommands::List => commands::docs::list(&config).await,
            DocsCommands::Upload { files } => commands::docs::upload(&config, &files).await,
            DocsCommands::Clear { yes } => commands::docs::clear(&config, yes).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

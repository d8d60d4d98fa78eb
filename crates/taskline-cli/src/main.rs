//! taskline CLI
//!
//! Command-line view over the entry store: every command hydrates the store
//! from the backend, runs one operation through it and prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use taskline_core::{Config, EntryStatus, EntryStore, HttpGateway, StoreError, StoreOptions};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "taskline")]
#[command(about = "taskline - track entries through pending, in-progress and finished")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries (board view unless filtered)
    #[command(alias = "ls")]
    List {
        /// Only show entries with this status
        #[arg(short, long)]
        status: Option<EntryStatus>,
    },
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        /// Entry description
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Show entry details
    Show {
        /// Entry ID (full or prefix)
        id: String,
    },
    /// Edit an entry (opens $EDITOR without flags)
    Edit {
        /// Entry ID (full or prefix)
        id: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<EntryStatus>,
    },
    /// Move an entry to another status
    Status {
        /// Entry ID (full or prefix)
        id: String,
        /// pending, in-progress or finished
        status: EntryStatus,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID (full or prefix)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, request_timeout_secs, notify_duration_ms, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli, output).await {
        let suggestion = e
            .downcast_ref::<StoreError>()
            .and_then(StoreError::recovery_suggestion);
        output.error(&format!("{:#}", e), suggestion);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands work without a backend
    if let Some(Commands::Config { command }) = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    init_logging(&config, cli.verbose);
    debug!("Using backend {}", config.api_url);

    let store = open_store(&config, output).await?;

    let result = match cli.command.unwrap_or(Commands::List { status: None }) {
        Commands::List { status } => commands::entry::list(&store, status, &output),
        Commands::Add { description } => {
            commands::entry::add(&store, description.join(" "), &output).await
        }
        Commands::Show { id } => commands::entry::show(&store, id, &output).await,
        Commands::Edit {
            id,
            description,
            status,
        } => commands::entry::edit(&store, id, description, status, &output).await,
        Commands::Status { id, status } => {
            commands::entry::set_status(&store, id, status, &output).await
        }
        Commands::Delete { id, yes } => commands::entry::delete(&store, id, yes, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    store.shutdown().await;
    result
}

/// Hydrate the store from the configured backend
async fn open_store(config: &Config, output: Output) -> Result<EntryStore> {
    let gateway = HttpGateway::from_config(config).map_err(StoreError::from)?;

    EntryStore::open_with(gateway, output, StoreOptions::from_config(config))
        .await
        .with_context(|| format!("Failed to load entries from {}", config.api_url))
}

/// Initialize stderr logging
///
/// Level comes from --verbose, then TASKLINE_LOG, then the config file.
fn init_logging(config: &Config, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("taskline_core=debug,taskline_cli=debug")
    } else if let Ok(filter) = EnvFilter::try_from_env("TASKLINE_LOG") {
        filter
    } else {
        EnvFilter::new(format!(
            "taskline_core={},taskline_cli={}",
            config.log_level, config.log_level
        ))
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

//! # dungeon-cli
//!
//! Command-line client for the dungeon rollup.
//!
//! ## Commands
//!
//! - `snapshot`: Read the world once and print it as JSON
//! - `watch`: Poll continuously, one line per snapshot
//! - `act`: Submit a player command
//! - `encode`: Print the payload for a command without submitting it
//! - `decode`: Recover account and command from a payload
//! - `accounts`: List configured accounts
//!
//! ## Example
//!
//! ```bash
//! # Where is everybody?
//! dungeon-cli --account tz1abc snapshot
//!
//! # Follow the world for ten ticks
//! dungeon-cli --account alice watch --ticks 10
//!
//! # Drop the item in slot 0, then buy a potion from bob
//! dungeon-cli --account alice act drop 0
//! dungeon-cli --account alice act buy tz1bob potion
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{accounts, act, decode, encode, snapshot, watch, ActionArg};
use config::CliConfig;

/// Command-line client for the dungeon rollup.
#[derive(Parser, Debug)]
#[command(name = "dungeon-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: dungeon-cli.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sequencer base URL, overrides the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Account alias from the config file, or a raw account identifier
    #[arg(long, short, global = true)]
    account: Option<String>,

    /// Log filter, e.g. `debug` or `dungeon_sync_client=trace` (default: RUST_LOG or info)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the world once and print the snapshot as JSON
    Snapshot,

    /// Poll continuously and print one line per snapshot
    Watch {
        /// Stop after this many snapshots
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Submit a command for the selected account
    Act {
        #[command(subcommand)]
        action: ActionArg,
    },

    /// Print the payload for a command without submitting it
    Encode {
        #[command(subcommand)]
        action: ActionArg,
    },

    /// Recover account and command from a hex payload
    Decode {
        /// Hex payload
        payload: String,
    },

    /// List configured accounts
    Accounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let account = || config.resolve_account(cli.account.as_deref());
    let sync_config = config.sync_config(cli.endpoint.as_deref());

    match cli.command {
        Commands::Snapshot => {
            snapshot::run(&sync_config, &account()?).await?;
        }
        Commands::Watch { ticks } => {
            watch::run(&sync_config, &account()?, ticks).await?;
        }
        Commands::Act { action } => {
            act::run(&sync_config, &account()?, action.into()).await?;
        }
        Commands::Encode { action } => {
            encode::run(&account()?, &action.into());
        }
        Commands::Decode { payload } => {
            decode::run(&payload)?;
        }
        Commands::Accounts => {
            accounts::run(&config);
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; stdout stays machine-readable.
fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("Invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod geocode;
mod input;
mod locate;
mod wizard;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rainwise::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "rainwise")]
#[command(about = "Rainwater harvesting intake wizard")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the assessment wizard interactively
    Wizard {
        /// Show the map without click, drag or locate
        #[arg(long)]
        read_only_map: bool,
    },

    /// Look up an address and print the first match
    Geocode {
        /// Address to look up
        #[arg(required = true)]
        address: Vec<String>,
    },

    /// Ask the configured geolocation provider for a position
    Locate,

    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Wizard { read_only_map } => wizard::cmd_wizard(&settings, read_only_map).await,
        Commands::Geocode { address } => geocode::cmd_geocode(&settings, &address.join(" ")).await,
        Commands::Locate => locate::cmd_locate(&settings).await,
        Commands::Config => config_cmd::cmd_config_show(&config),
    }
}

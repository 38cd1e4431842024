//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod serve;
mod targets;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::scrapers::StrategyKind;

#[derive(Parser)]
#[command(name = "listcrawl")]
#[command(about = "Ranked list extraction from static and infinite-scroll pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "LISTCRAWL_CONFIG")]
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
    /// Crawl a target and print the result envelope as JSON
    Crawl {
        /// Target ID (see `listcrawl targets`)
        target: String,
        /// Strategy to try first (overrides the target's primary)
        #[arg(short, long)]
        strategy: Option<StrategyKind>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Serve crawls over HTTP
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List configured targets
    Targets,
}

async fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(&path).await?,
        None => Config::load().await?,
    };
    Ok(config)
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;

    match cli.command {
        Commands::Crawl {
            target,
            strategy,
            pretty,
        } => crawl::cmd_crawl(&config, &target, strategy, pretty).await,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            serve::cmd_serve(&config, &bind).await
        }
        Commands::Targets => targets::cmd_targets(&config),
    }
}

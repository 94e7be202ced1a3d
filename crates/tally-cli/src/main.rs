//! Tally CLI - Receipt expense breakdowns
//!
//! Usage:
//!   tally analyze receipt.jpg      Upload a receipt and show the breakdown
//!   tally analyze receipt.jpg --json
//!   tally health                   Check the analysis service
//!   tally config                   Show effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.endpoint.as_deref())?;

    match cli.command {
        Commands::Analyze { file, json } => commands::cmd_analyze(&config, &file, json).await,
        Commands::Health => commands::cmd_health(&config).await,
        Commands::Config => commands::cmd_config(&config, cli.config.as_deref()),
    }
}

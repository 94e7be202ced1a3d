//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - See where a receipt's money went
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Break a receipt image down into categorized expenses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/tally/config/client.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis service base URL, e.g. http://localhost:5000/api
    ///
    /// Takes precedence over the config file and TALLY_API_URL.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a receipt image and show its expense breakdown
    Analyze {
        /// Receipt image (JPG, PNG, etc.)
        file: PathBuf,

        /// Print the view-model as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Check whether the analysis service is reachable
    Health,

    /// Show the effective configuration
    Config,
}

//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tabsplit - Split a restaurant bill among friends
#[derive(Parser)]
#[command(name = "tabsplit")]
#[command(about = "Turn recognized receipt text into a per-person bill split", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rules file layered over the built-in rule tables
    ///
    /// Defaults to <data dir>/tabsplit/config/rules.toml when that file exists.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse recognized receipt lines (one per line, in reading order)
    Parse {
        /// Text file of recognized lines
        file: PathBuf,

        /// Print the parsed receipt as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a receipt and draft a finalized receipt shared by everyone
    Draft {
        /// Text file of recognized lines
        file: PathBuf,

        /// Participant names, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        people: Vec<String>,

        /// Display name (defaults to the merchant name or file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Write the receipt JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compute each participant's share of a finalized receipt
    Split {
        /// Receipt JSON file (as written by `draft`)
        file: PathBuf,

        /// Print the allocation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active rule tables
    Rules {
        /// Only print the rules file path
        #[arg(long)]
        path: bool,
    },
}

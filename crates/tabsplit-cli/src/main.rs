//! tabsplit CLI - Split a restaurant bill from recognized receipt text
//!
//! Usage:
//!   tabsplit parse lines.txt                      Parse recognized lines
//!   tabsplit draft lines.txt --people Ana,Ben     Build a receipt shared by everyone
//!   tabsplit split receipt.json                   Compute each person's share
//!   tabsplit rules                                Show the active rule tables

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Parse { file, json } => {
            let rules = commands::load_rules(cli.rules.as_deref())?;
            commands::cmd_parse(rules, &file, json)
        }
        Commands::Draft {
            file,
            people,
            name,
            out,
        } => {
            let rules = commands::load_rules(cli.rules.as_deref())?;
            commands::cmd_draft(rules, &file, &people, name.as_deref(), out.as_deref())
        }
        Commands::Split { file, json } => commands::cmd_split(&file, json),
        Commands::Rules { path } => commands::cmd_rules(cli.rules.as_deref(), path),
    }
}

//! CLI argument parsing for cursorqueue

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cq")]
#[command(author, version, about = "Depth-first pagination cursor queue", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Comma separated levels, outermost first (overrides config)
    #[arg(short, long, global = true)]
    pub levels: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show configured levels and their ranks
    Levels,

    /// Enqueue cursors and print the order they drain in
    Order {
        /// Cursors as KIND[:CURSOR[:PARENT]]
        #[arg(required = true)]
        cursors: Vec<String>,
    },

    /// Replay a scripted crawl
    Crawl {
        /// YAML crawl script
        #[arg(required = true)]
        script: PathBuf,

        /// Stop after this many fetches
        #[arg(short, long)]
        max_fetches: Option<usize>,

        /// Save pending cursors here when the crawl stops early
        #[arg(short = 'o', long)]
        checkpoint: Option<PathBuf>,
    },

    /// Continue a scripted crawl from a checkpoint
    Resume {
        /// Checkpoint file written by `crawl`
        #[arg(required = true)]
        from: PathBuf,

        /// YAML crawl script
        #[arg(required = true)]
        script: PathBuf,

        /// Stop after this many fetches
        #[arg(short, long)]
        max_fetches: Option<usize>,

        /// Save pending cursors here when the crawl stops early
        #[arg(short = 'o', long)]
        checkpoint: Option<PathBuf>,
    },
}

/// Parse `KIND[:CURSOR[:PARENT]]`; empty parts are `None`
pub fn parse_cursor_arg(arg: &str) -> (String, Option<String>, Option<String>) {
    let mut parts = arg.splitn(3, ':');
    let kind = parts.next().unwrap_or_default().to_string();
    let cursor = parts.next().filter(|p| !p.is_empty()).map(str::to_string);
    let parent = parts.next().filter(|p| !p.is_empty()).map(str::to_string);
    (kind, cursor, parent)
}

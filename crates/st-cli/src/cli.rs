//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Item observation tracker.
///
/// Replays captured client-session event logs, attributes observed items to
/// storage locations, and keeps a deduplicated local record.
#[derive(Debug, Parser)]
#[command(name = "stash", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a captured session log and export observed items.
    ///
    /// Reads JSONL records (session-state updates and packet events),
    /// writes exportable items as JSONL to stdout, and persists unique
    /// items to the local database.
    Replay {
        /// Path to the captured session log.
        input: PathBuf,
    },

    /// Show what the local store currently holds.
    Status,
}

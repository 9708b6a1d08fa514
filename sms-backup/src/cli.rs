//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "sms-backup")]
#[command(about = "SMS backup service CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the backup service and feed it SMS events (JSON lines) from a file or stdin.
    Run {
        /// Events file; stdin when omitted.
        #[arg(short, long)]
        events: Option<PathBuf>,
        /// Stop once the event source is exhausted instead of waiting for Ctrl-C.
        #[arg(long)]
        exit_on_eof: bool,
    },
    /// Back up the most recent inbox messages once and exit.
    Sync,
    /// Print the document key a message would be stored under.
    Key {
        #[arg(short, long)]
        sender: String,
        /// Receipt time in epoch milliseconds.
        #[arg(short, long, allow_hyphen_values = true)]
        timestamp: i64,
    },
    /// List the newest documents of the local SQLite mirror.
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

/// Load AppConfig from environment.
pub fn load_config() -> Result<AppConfig> {
    AppConfig::load()
}

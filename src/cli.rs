//! Command-line interface definitions for subsys.
//!
//! The CLI definitions are shared between the main binary and the xtask
//! crate, which renders man pages from them.
//!
//! Note: Field-level documentation is provided via clap attributes, so
//! missing_docs is allowed for this module.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for subsys.
#[derive(Parser)]
#[command(
    name = "subsys",
    version = crate::VERSION,
    about = "Track directory changes and package snapshots",
    long_about = "Detects added, modified and deleted files by SHA-256 digest and packages the working tree into named zip snapshots"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "directory", global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize snapshot tracking in the working directory
    Init,

    /// Show changes since the last snapshot without recording anything
    Status {
        /// Print one `A|M|D path` line per change
        #[arg(short, long)]
        short: bool,
    },

    /// Archive the working directory and record its state
    Snap {
        /// Snapshot name (no whitespace or `&$+,:;=?@#<>[]{}/\^%`)
        #[arg(short, long)]
        name: String,

        /// Print one `A|M|D path` line per change
        #[arg(short, long)]
        short: bool,
    },

    /// List snapshots, newest first
    List,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

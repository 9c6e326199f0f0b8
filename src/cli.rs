//! CLI argument parsing.
use clap::{Parser, Subcommand};

use branchsmith::config::DEFAULT_CONFIG_FILE;

pub mod reconcile;
pub mod show;

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile a branch config against a local git repository and print
    /// the resulting file changes.
    Reconcile {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        /// Branch config file (.toml or .json).
        config: String,

        #[arg(long, default_value = ".")]
        /// Path to the git repository.
        repo: String,

        #[arg(long)]
        /// Write the outcome to this file instead of stdout.
        out_file: Option<String>,
    },

    /// List the built-in handlers and their capabilities.
    Handlers,

    /// Print the JSON schema of the branch config file.
    Schema {
        #[arg(long)]
        out_file: Option<String>,
    },
}

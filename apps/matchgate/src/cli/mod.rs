//! # Matchgate CLI Module
//!
//! This module implements the CLI interface for Matchgate.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `normalize` - Normalize raw facts
//! - `derive` - Derive the capability map
//! - `explain` - Show predicates, fired stages and the map
//! - `check` - Check required capabilities (non-zero exit when denied)
//! - `catalog` - List the base capabilities
//!
//! Fact-reading commands take `-f FILE` or read JSON from stdin.

mod commands;

use clap::{Parser, Subcommand};
use matchgate_core::MatchgateError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Matchgate - capability derivation for member facts
///
/// Normalizes account, billing, verification and role facts and derives
/// the capabilities a member holds.
#[derive(Parser, Debug)]
#[command(name = "matchgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Normalize raw facts into the canonical vocabulary
    Normalize {
        /// Path to a JSON facts file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Derive the capability map
    Derive {
        /// Path to a JSON facts file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show predicates, fired stages and the capability map
    Explain {
        /// Path to a JSON facts file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check that every required capability is allowed
    Check {
        /// Required capabilities (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        require: Vec<String>,

        /// Path to a JSON facts file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List the base capabilities
    Catalog,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MatchgateError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(cli.config.as_deref(), host, port).await
        }
        Some(Commands::Normalize { file }) => cmd_normalize(file.as_deref(), json_mode),
        Some(Commands::Derive { file }) => cmd_derive(file.as_deref(), json_mode),
        Some(Commands::Explain { file }) => cmd_explain(file.as_deref(), json_mode),
        Some(Commands::Check { require, file }) => {
            cmd_check(file.as_deref(), &require, json_mode)
        }
        Some(Commands::Catalog) | None => cmd_catalog(json_mode),
    }
}

//! # Matchgate - Capability Server
//!
//! The main binary for the Matchgate capability engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for normalizing facts and deriving capabilities
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/matchgate (THE BINARY)        │
//! │                                               │
//! │   ┌─────────────┐        ┌─────────────┐      │
//! │   │    CLI      │        │  HTTP API   │      │
//! │   │   (clap)    │        │   (axum)    │      │
//! │   └──────┬──────┘        └──────┬──────┘      │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │             ┌────────────────┐                │
//! │             │ matchgate-core │                │
//! │             │  (THE LOGIC)   │                │
//! │             └────────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! matchgate server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! matchgate derive -f member.json
//! echo '{"status":"Active","role":"mod"}' | matchgate explain
//! matchgate check -r sendMessage,browseDiscovery -f member.json
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // MATCHGATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MATCHGATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "matchgate=debug,tower_http=debug"
    } else {
        "matchgate=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so JSON output on stdout stays clean.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && matches!(cli.command, Some(cli::Commands::Server { .. })) {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Matchgate startup banner.
fn print_banner() {
    println!(
        r#"
  ┌┬┐┌─┐┌┬┐┌─┐┬ ┬┌─┐┌─┐┌┬┐┌─┐
  │││├─┤ │ │  ├─┤│ ┬├─┤ │ ├┤
  ┴ ┴┴ ┴ ┴ └─┘┴ ┴└─┘┴ ┴ ┴ └─┘

  Capability Server v{}

  Normalized • Deterministic • Total
"#,
        env!("CARGO_PKG_VERSION")
    );
}

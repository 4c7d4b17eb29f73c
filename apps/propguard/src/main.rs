//! # propguard
//!
//! The main binary for the propguard props sanitizer.
//!
//! This application provides:
//! - CLI commands over graph documents (strip, detect, primitive, stringify,
//!   render)
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │            apps/propguard (THE BINARY)            │
//! │                                                   │
//! │   ┌─────────────┐          ┌─────────────┐        │
//! │   │    CLI      │          │  HTTP API   │        │
//! │   │   (clap)    │          │   (axum)    │        │
//! │   └──────┬──────┘          └──────┬──────┘        │
//! │          └───────────┬────────────┘               │
//! │                      ▼                            │
//! │             ┌────────────────┐                    │
//! │             │ propguard-core │                    │
//! │             │  (THE LOGIC)   │                    │
//! │             └────────────────┘                    │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! propguard server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! propguard strip -f props.json --pretty
//! propguard detect -f props.json
//! propguard render -f props.json --component Chart
//! ```

use clap::Parser;
use propguard::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // PROPGUARD_LOG_FORMAT=json switches to JSON lines.
    let log_format = std::env::var("PROPGUARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "propguard=info,propguard_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    // Banner only for the server; document commands write results to stdout.
    if !cli.quiet && matches!(cli.command, cli::Commands::Server { .. }) {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the propguard startup banner.
fn print_banner() {
    println!(
        r#"
  propguard v{}

  Cycle-safe props • Safe logging • Error boundaries
"#,
        env!("CARGO_PKG_VERSION")
    );
}

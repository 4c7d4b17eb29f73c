//! # propguard CLI Module
//!
//! This module implements the CLI interface for propguard.
//!
//! ## Available Commands
//!
//! - `strip` - Replace circular references in a graph document
//! - `detect` - Report whether a graph document contains a cycle
//! - `primitive` - Convert a graph document to a log-safe string
//! - `stringify` - Pretty debug text for a graph document
//! - `render` - Render a document as component props through a boundary
//! - `server` - Start the HTTP server

mod commands;

use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use propguard_core::PropguardError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// propguard - cycle-safe props sanitizer
///
/// Reads graph documents (JSON with `$ref` pointers for shared and cyclic
/// references) and renders them safely.
#[derive(Parser, Debug)]
#[command(name = "propguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace circular references with "[Circular]"
    Strip {
        /// Path to the graph document
        #[arg(short, long)]
        file: PathBuf,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Report whether the document contains a cycle
    Detect {
        /// Path to the graph document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Convert the document to a log-safe string
    Primitive {
        /// Path to the graph document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Pretty debug text for the document
    Stringify {
        /// Path to the graph document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Render the document as props of a component
    Render {
        /// Path to the graph document used as props
        #[arg(short, long)]
        file: PathBuf,

        /// Component name
        #[arg(long)]
        component: String,

        /// Make the component fail with this message
        #[arg(long)]
        fail: Option<String>,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PropguardError> {
    let mut config = AppConfig::load_with_env(&cli.config)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Strip { file, pretty } => cmd_strip(&file, json_mode, pretty),
        Commands::Detect { file } => cmd_detect(&file, json_mode),
        Commands::Primitive { file } => cmd_primitive(&file, json_mode),
        Commands::Stringify { file } => cmd_stringify(&file, json_mode),
        Commands::Render {
            file,
            component,
            fail,
        } => cmd_render(&config, &file, json_mode, &component, fail),
        Commands::Server { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_arguments() {
        let cli = Cli::try_parse_from([
            "propguard", "-q", "render", "-f", "props.json", "--component", "Chart", "--fail",
            "boom",
        ])
        .expect("parse");

        assert!(cli.quiet);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        let Commands::Render {
            component, fail, ..
        } = cli.command
        else {
            unreachable!("render expected");
        };
        assert_eq!(component, "Chart");
        assert_eq!(fail.as_deref(), Some("boom"));
    }

    #[test]
    fn server_overrides_are_optional() {
        let cli = Cli::try_parse_from(["propguard", "server", "-p", "9090"]).expect("parse");
        let Commands::Server { host, port } = cli.command else {
            unreachable!("server expected");
        };
        assert_eq!(host, None);
        assert_eq!(port, Some(9090));
    }
}

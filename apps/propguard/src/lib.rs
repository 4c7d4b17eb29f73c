//! # propguard
//!
//! Application layer over `propguard-core`: configuration loading, the
//! command-line interface and the HTTP API.
//!
//! The binary in `main.rs` only sets up logging and dispatches to [`cli`].

pub mod api;
pub mod cli;
pub mod config;

pub use config::{AppConfig, ServerConfig};

//! # Configuration
//!
//! `propguard.toml` loading plus environment overrides.
//!
//! ```toml
//! [diagnostics]
//! enabled = true
//! namespaces = "app:*"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! body_limit_bytes = 2097152
//! cors_origins = ["http://localhost:3000"]
//! ```
//!
//! ## Environment Variables
//!
//! - `PROPGUARD_DEBUG`: namespace filter (`app:*`, `app:error`). A
//!   non-empty value enables diagnostics; an empty value disables them.
//! - `PROPGUARD_CORS_ORIGINS`: comma-separated allowed origins, or `*`.

use propguard_core::{DiagnosticsConfig, PropguardError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "propguard.toml";

/// Default request body limit (2 MB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// CONFIG TYPES
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub diagnostics: DiagnosticsConfig,
    pub server: ServerConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    /// `None` allows localhost origins only.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            cors_origins: None,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse config text.
    pub fn from_toml_str(text: &str) -> Result<Self, PropguardError> {
        toml::from_str(text).map_err(|e| PropguardError::ConfigError(e.to_string()))
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PropguardError> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| PropguardError::IoError(format!("Cannot read config metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(PropguardError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| PropguardError::IoError(format!("Read config: {}", e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `path` and apply the process environment.
    pub fn load_with_env(path: &Path) -> Result<Self, PropguardError> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespaces) = lookup("PROPGUARD_DEBUG") {
            let namespaces = namespaces.trim();
            self.diagnostics.enabled = !namespaces.is_empty();
            if !namespaces.is_empty() {
                self.diagnostics.namespaces = namespaces.to_string();
            }
        }

        if let Some(origins) = lookup("PROPGUARD_CORS_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !parsed.is_empty() {
                self.server.cors_origins = Some(parsed);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Integration tests for configuration file loading.

use propguard::config::{AppConfig, DEFAULT_BODY_LIMIT_BYTES};
use propguard_core::{Channel, PropguardError};
use std::io::Write;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig::load(&dir.path().join("propguard.toml")).expect("load");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_full_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[diagnostics]
enabled = true
namespaces = "app:*,-app:props"

[server]
host = "0.0.0.0"
port = 9000
body_limit_bytes = 1024
cors_origins = ["http://localhost:3000"]
"#
    )
    .expect("write");

    let config = AppConfig::load(file.path()).expect("load");
    assert!(config.diagnostics.enabled);
    assert!(config.diagnostics.is_channel_enabled(Channel::Error));
    assert!(!config.diagnostics.is_channel_enabled(Channel::Props));
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.body_limit_bytes, 1024);
    assert_eq!(
        config.server.cors_origins,
        Some(vec!["http://localhost:3000".to_string()])
    );
}

#[test]
fn test_empty_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = AppConfig::load(file.path()).expect("load");
    assert_eq!(config.server.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    assert!(!config.diagnostics.enabled);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server\nport = ").expect("write");

    let result = AppConfig::load(file.path());
    assert!(matches!(result, Err(PropguardError::ConfigError(_))));
}

#[test]
fn test_wrong_type_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server]\nport = \"eighty\"").expect("write");

    let result = AppConfig::load(file.path());
    assert!(matches!(result, Err(PropguardError::ConfigError(_))));
}

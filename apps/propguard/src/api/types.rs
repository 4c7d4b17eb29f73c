//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use propguard_core::{FallbackView, HostRender, PropguardError, Rendered};
use serde::{Deserialize, Serialize};

/// Maximum component name length in bytes.
pub const MAX_COMPONENT_NAME_LENGTH: usize = 256;

/// Maximum length of a requested failure message in bytes.
pub const MAX_FAILURE_MESSAGE_LENGTH: usize = 4096;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every 4xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// DOCUMENT OPERATIONS
// =============================================================================

/// Request carrying one graph document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub document: serde_json::Value,
}

/// Result of `POST /strip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripResponse {
    pub result: serde_json::Value,
    pub circular_count: usize,
}

/// Result of `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub circular: bool,
}

/// Result of `POST /primitive` and `POST /stringify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

// =============================================================================
// RENDER REQUEST/RESPONSE
// =============================================================================

/// Render one component through the shared host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub component: String,
    /// Props as a graph document.
    #[serde(default)]
    pub props: serde_json::Value,
    /// When set, the child fails with this message.
    #[serde(default)]
    pub fail: Option<String>,
}

impl RenderRequest {
    /// Validate field lengths before anything reaches the host.
    pub fn validate(&self) -> Result<(), PropguardError> {
        validate_component_name(&self.component)?;
        let fail_len = self.fail.as_ref().map_or(0, String::len);
        if fail_len > MAX_FAILURE_MESSAGE_LENGTH {
            return Err(PropguardError::InvalidDocument(format!(
                "Failure message length {} exceeds maximum {} bytes",
                fail_len, MAX_FAILURE_MESSAGE_LENGTH
            )));
        }
        Ok(())
    }
}

/// Outcome of a render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub component: String,
    pub render_count: u64,
    /// Sanitized props as seen by the child.
    pub props: serde_json::Value,
    /// Child output, when it rendered.
    pub output: Option<String>,
    /// Fallback panel, when the boundary caught a failure.
    pub fallback: Option<FallbackView>,
}

impl From<HostRender<String>> for RenderResponse {
    fn from(render: HostRender<String>) -> Self {
        let (output, fallback) = match render.output {
            Rendered::Children(text) => (Some(text), None),
            Rendered::Fallback(view) => (None, Some(view)),
        };
        Self {
            component: render.component,
            render_count: render.render_count,
            props: render.props.to_json(),
            output,
            fallback,
        }
    }
}

/// Clear a component's failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryRequest {
    pub component: String,
}

/// Result of `POST /render/retry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryResponse {
    pub component: String,
    pub retried: bool,
}

/// Check a component name.
pub fn validate_component_name(name: &str) -> Result<(), PropguardError> {
    if name.trim().is_empty() {
        return Err(PropguardError::InvalidDocument(
            "Component name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_COMPONENT_NAME_LENGTH {
        return Err(PropguardError::InvalidDocument(format!(
            "Component name length {} exceeds maximum {} bytes",
            name.len(),
            MAX_COMPONENT_NAME_LENGTH
        )));
    }
    Ok(())
}

//! # propguard HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /strip` - Replace circular references with `"[Circular]"`
//! - `POST /detect` - Report whether a document contains a cycle
//! - `POST /primitive` - Convert a document to a log-safe string
//! - `POST /stringify` - Pretty debug text for a document
//! - `POST /render` - Render a component through the shared host
//! - `POST /render/retry` - Clear a component's failure
//!
//! ## Configuration
//!
//! Host, port, body limit and CORS origins come from the `[server]` section
//! of the config file (`PROPGUARD_CORS_ORIGINS` overrides the origins).

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `propguard::api::*`)
pub use handlers::{
    detect_handler, health_handler, primitive_handler, render_handler, retry_handler,
    strip_handler, stringify_handler,
};
pub use types::{
    DetectResponse, DocumentRequest, ErrorResponse, HealthResponse, MAX_COMPONENT_NAME_LENGTH,
    RenderRequest, RenderResponse, RetryRequest, RetryResponse, StripResponse, TextResponse,
};

use crate::config::{AppConfig, ServerConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use propguard_core::{ComponentHost, Diagnostics, PropguardError, TracingSink};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the component host plus server settings.
#[derive(Clone)]
pub struct AppState {
    /// Mounted components, shared by all render requests.
    pub host: Arc<RwLock<ComponentHost>>,
    /// Server settings used to build the router.
    pub server: Arc<ServerConfig>,
}

impl AppState {
    /// Create state from configuration, reporting diagnostics to `tracing`.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let diagnostics = Diagnostics::new(config.diagnostics.clone(), Arc::new(TracingSink));
        Self::with_diagnostics(diagnostics, config.server.clone())
    }

    /// Create state with an explicit diagnostics handle.
    #[must_use]
    pub fn with_diagnostics(diagnostics: Diagnostics, server: ServerConfig) -> Self {
        Self {
            host: Arc::new(RwLock::new(ComponentHost::new(diagnostics))),
            server: Arc::new(server),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins
/// - `None`: localhost only
/// - otherwise: exactly the listed origins
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some([only]) if only == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed_origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit - rejects oversized documents
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.server.cors_origins.as_deref());
    let body_limit = state.server.body_limit_bytes;

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/strip", post(handlers::strip_handler))
        .route("/detect", post(handlers::detect_handler))
        .route("/primitive", post(handlers::primitive_handler))
        .route("/stringify", post(handlers::stringify_handler))
        .route("/render", post(handlers::render_handler))
        .route("/render/retry", post(handlers::retry_handler))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(config: &AppConfig) -> Result<(), PropguardError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PropguardError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("propguard HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| PropguardError::IoError(format!("Server error: {}", e)))
}

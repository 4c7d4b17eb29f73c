//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every document endpoint builds a fresh value graph from the request body;
//! only the component host is shared between requests.

use super::{
    AppState,
    types::{
        DetectResponse, DocumentRequest, ErrorResponse, HealthResponse, RenderRequest,
        RenderResponse, RetryRequest, RetryResponse, StripResponse, TextResponse,
        validate_component_name,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use propguard_core::{
    Document, PropguardError, RenderError, has_circular_references, parse_document,
    primitive_child, remove_circular_references, safe_stringify, to_primitive,
};

/// Error half of every handler result.
type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(e: PropguardError) -> ApiError {
    tracing::debug!("Rejected request: {}", e);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
}

fn load(request: &DocumentRequest) -> Result<Document, ApiError> {
    parse_document(&request.document).map_err(bad_request)
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// DOCUMENT HANDLERS
// =============================================================================

/// Strip circular references from a document.
pub async fn strip_handler(
    Json(request): Json<DocumentRequest>,
) -> Result<Json<StripResponse>, ApiError> {
    let doc = load(&request)?;
    let stripped = remove_circular_references(&doc.graph, &doc.root);

    Ok(Json(StripResponse {
        circular_count: stripped.circular_count(),
        result: stripped.to_json(),
    }))
}

/// Report whether a document contains a cycle.
pub async fn detect_handler(
    Json(request): Json<DocumentRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    let doc = load(&request)?;
    Ok(Json(DetectResponse {
        circular: has_circular_references(&doc.graph, &doc.root),
    }))
}

/// Convert a document to its primitive string.
pub async fn primitive_handler(
    Json(request): Json<DocumentRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    let doc = load(&request)?;
    Ok(Json(TextResponse {
        text: to_primitive(&doc.graph, &doc.root),
    }))
}

/// Debug-stringify a document.
pub async fn stringify_handler(
    Json(request): Json<DocumentRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    let doc = load(&request)?;
    Ok(Json(TextResponse {
        text: safe_stringify(&doc.graph, &doc.root),
    }))
}

// =============================================================================
// RENDER HANDLERS
// =============================================================================

/// Render a component through the shared host.
pub async fn render_handler(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    request.validate().map_err(bad_request)?;
    let doc = parse_document(&request.props).map_err(bad_request)?;

    let mut host = state.host.write().await;
    let render = match request.fail {
        Some(message) => {
            let component = request.component.clone();
            host.render(&request.component, &doc.graph, &doc.root, move |_, _, _| {
                Err::<String, _>(RenderError::new(message).in_component(component))
            })
        }
        None => host.render(&request.component, &doc.graph, &doc.root, primitive_child),
    };

    Ok(Json(RenderResponse::from(render)))
}

/// Clear a component's failure so the next render retries it.
pub async fn retry_handler(
    State(state): State<AppState>,
    Json(request): Json<RetryRequest>,
) -> Result<Json<RetryResponse>, ApiError> {
    validate_component_name(&request.component).map_err(bad_request)?;

    let mut host = state.host.write().await;
    if !host.retry(&request.component) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "Component '{}' is not mounted",
                request.component
            ))),
        ));
    }

    Ok(Json(RetryResponse {
        component: request.component,
        retried: true,
    }))
}

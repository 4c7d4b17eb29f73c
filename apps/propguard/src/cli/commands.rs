//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::AppConfig;
use propguard_core::{
    ComponentHost, Diagnostics, Document, PropguardError, RenderError, Rendered, TracingSink,
    document_from_slice, formats::MAX_DOCUMENT_BYTES, has_circular_references, primitive_child,
    remove_circular_references, safe_stringify, to_primitive,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE LOADING
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), PropguardError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| PropguardError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(PropguardError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve a path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, PropguardError> {
    let canonical = path.canonicalize().map_err(|e| {
        PropguardError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PropguardError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and parse a graph document.
pub fn read_document(path: &Path) -> Result<Document, PropguardError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_DOCUMENT_BYTES as u64)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| PropguardError::IoError(format!("Read file: {}", e)))?;

    let doc = document_from_slice(&contents)?;
    tracing::debug!(
        "Loaded {:?}: {} objects",
        validated_path,
        doc.graph.node_count()
    );
    Ok(doc)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// STRIP COMMAND
// =============================================================================

/// Print the document with circular references replaced.
pub fn cmd_strip(file: &Path, json_mode: bool, pretty: bool) -> Result<(), PropguardError> {
    let doc = read_document(file)?;
    let stripped = remove_circular_references(&doc.graph, &doc.root);

    if json_mode {
        print_json(&serde_json::json!({
            "result": stripped.to_json(),
            "circular_count": stripped.circular_count()
        }));
        return Ok(());
    }

    let json = stripped.to_json();
    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .map_err(|e| PropguardError::SerializationError(e.to_string()))?;
    println!("{}", text);

    Ok(())
}

// =============================================================================
// DETECT COMMAND
// =============================================================================

/// Report whether the document contains a cycle.
pub fn cmd_detect(file: &Path, json_mode: bool) -> Result<(), PropguardError> {
    let doc = read_document(file)?;
    let circular = has_circular_references(&doc.graph, &doc.root);

    if json_mode {
        print_json(&serde_json::json!({ "circular": circular }));
    } else if circular {
        println!("Circular references found");
    } else {
        println!("No circular references");
    }

    Ok(())
}

// =============================================================================
// TEXT COMMANDS
// =============================================================================

/// Print the document's primitive string.
pub fn cmd_primitive(file: &Path, json_mode: bool) -> Result<(), PropguardError> {
    let doc = read_document(file)?;
    let text = to_primitive(&doc.graph, &doc.root);

    if json_mode {
        print_json(&serde_json::json!({ "text": text }));
    } else {
        println!("{}", text);
    }
    Ok(())
}

/// Print the document's debug text.
pub fn cmd_stringify(file: &Path, json_mode: bool) -> Result<(), PropguardError> {
    let doc = read_document(file)?;
    let text = safe_stringify(&doc.graph, &doc.root);

    if json_mode {
        print_json(&serde_json::json!({ "text": text }));
    } else {
        println!("{}", text);
    }
    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Render the document as component props through an error boundary.
pub fn cmd_render(
    config: &AppConfig,
    file: &Path,
    json_mode: bool,
    component: &str,
    fail: Option<String>,
) -> Result<(), PropguardError> {
    let doc = read_document(file)?;
    let diagnostics = Diagnostics::new(config.diagnostics.clone(), Arc::new(TracingSink));
    let mut host = ComponentHost::new(diagnostics);

    let render = match fail {
        Some(message) => {
            let name = component.to_string();
            host.render(component, &doc.graph, &doc.root, move |_, _, _| {
                Err::<String, _>(RenderError::new(message).in_component(name))
            })
        }
        None => host.render(component, &doc.graph, &doc.root, primitive_child),
    };

    if json_mode {
        let value = serde_json::to_value(&render)
            .map_err(|e| PropguardError::SerializationError(e.to_string()))?;
        print_json(&value);
        return Ok(());
    }

    match render.output {
        Rendered::Children(text) => {
            println!("{} (render #{})", render.component, render.render_count);
            println!("{}", text);
        }
        Rendered::Fallback(view) => {
            println!("{}", view.title);
            println!("{}", view.message);
            if let Some(label) = view.retry_label {
                println!("[{}]", label);
            }
        }
    }
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig) -> Result<(), PropguardError> {
    println!("propguard Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", config.server.host);
    println!("  Port:        {}", config.server.port);
    println!("  Body limit:  {} bytes", config.server.body_limit_bytes);
    println!(
        "  Diagnostics: {}",
        if config.diagnostics.enabled {
            config.diagnostics.namespaces.as_str()
        } else {
            "off"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health       - Health check");
    println!("  POST /strip        - Replace circular references");
    println!("  POST /detect       - Detect circular references");
    println!("  POST /primitive    - Convert to a log-safe string");
    println!("  POST /stringify    - Debug stringify");
    println!("  POST /render       - Render a component");
    println!("  POST /render/retry - Retry a failed component");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

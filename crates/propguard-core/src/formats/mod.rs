//! # Formats
//!
//! Serialized forms of value graphs that enter the system from outside.
//!
//! Graph documents are the only input format: JSON with `$ref` pointers
//! for shared and cyclic references. File I/O lives in the app layer.

pub mod document;

pub use document::{
    Document, MAX_DOCUMENT_BYTES, document_from_slice, document_from_str, parse_document,
};

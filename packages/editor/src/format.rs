//! # Persisted Document Format
//!
//! A screenplay is stored as a JSON array of blocks:
//!
//! ```json
//! [
//!   { "type": "scene-heading", "children": [{ "text": "INT. KITCHEN - DAY" }] },
//!   { "type": "action", "children": [{ "text": "Steam rises.", "italic": true }] }
//! ]
//! ```
//!
//! The same shape crosses the remote-store boundary and is written to disk
//! with the `.screenplay` extension. Loading fails fast on anything that is
//! not a non-empty list of blocks with at least one run each.

use crate::document::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension used for screenplay files on disk
pub const FILE_EXTENSION: &str = "screenplay";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Document is not a list of blocks")]
    NotAList,

    #[error("Document has no blocks")]
    Empty,

    #[error("Block {0} has no text runs")]
    EmptyBlock(usize),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check the document invariants on a deserialized document
pub fn validate(doc: &Document) -> Result<(), FormatError> {
    if doc.is_empty() {
        return Err(FormatError::Empty);
    }
    if let Some(index) = doc.blocks().iter().position(|b| b.children.is_empty()) {
        return Err(FormatError::EmptyBlock(index));
    }
    Ok(())
}

/// Parse and validate a document from a JSON value
pub fn from_value(value: serde_json::Value) -> Result<Document, FormatError> {
    if !value.is_array() {
        return Err(FormatError::NotAList);
    }
    let doc: Document = serde_json::from_value(value)?;
    validate(&doc)?;
    Ok(doc)
}

/// Parse and validate a document from JSON text
pub fn parse_document(json: &str) -> Result<Document, FormatError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    from_value(value)
}

pub fn to_value(doc: &Document) -> Result<serde_json::Value, FormatError> {
    Ok(serde_json::to_value(doc)?)
}

/// Pretty-printed JSON, as written to disk
pub fn to_json_pretty(doc: &Document) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Path of a screenplay file named `name` inside `dir`
pub fn file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, FILE_EXTENSION))
}

/// Write a document as `<dir>/<name>.screenplay`
pub fn save_to_disk(doc: &Document, dir: &Path, name: &str) -> Result<PathBuf, FormatError> {
    let path = file_path(dir, name);
    std::fs::write(&path, to_json_pretty(doc)?)?;
    Ok(path)
}

/// Read and validate a screenplay file
pub fn load_from_disk(path: &Path) -> Result<Document, FormatError> {
    let json = std::fs::read_to_string(path)?;
    parse_document(&json)
}

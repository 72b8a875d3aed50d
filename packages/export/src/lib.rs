//! # Screenwright Export
//!
//! Turns a screenplay document into a paginated layout description.
//!
//! ```text
//! Document ──transform──▶ Vec<LayoutDirective> ─┐
//!                                               ├─▶ ExportPackage ──▶ backend
//! PageGeometry ─────────────────────────────────┘        (JSON | TextRenderer)
//! ```
//!
//! The transform never fails and never drops a block. Rendering backends
//! only see the package.

mod geometry;
mod layout;
mod text;

pub use geometry::{Margins, PageGeometry, POINTS_PER_INCH};
pub use layout::{transform, transform_block, Alignment, IndentLevel, LayoutDirective};
pub use text::{RenderOptions, TextPage, TextRenderer, PAGE_BREAK};

use screenwright_editor::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a rendering backend needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPackage {
    pub geometry: PageGeometry,
    pub directives: Vec<LayoutDirective>,
}

impl ExportPackage {
    pub fn new(document: &Document, geometry: PageGeometry) -> Self {
        Self {
            geometry,
            directives: transform(document),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn write_text(&self, path: &Path, renderer: &TextRenderer) -> Result<(), ExportError> {
        std::fs::write(path, renderer.render_to_string(self))?;
        Ok(())
    }
}

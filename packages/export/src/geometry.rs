//! Page geometry handed to a rendering backend alongside the directives.
//!
//! All lengths are in PostScript points (72 per inch).

use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f32 = 72.0;

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    /// 1.5in on the left, 1in elsewhere
    fn default() -> Self {
        Self {
            top: 72.0,
            right: 72.0,
            bottom: 72.0,
            left: 108.0,
        }
    }
}

/// Fixed page size, margins, font and footer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub font_family: String,
    pub font_size: f32,

    /// Running "N." footer, right-aligned
    pub page_numbers: bool,
}

impl PageGeometry {
    /// US Letter, Courier 12pt
    pub fn letter() -> Self {
        Self {
            width: 8.5 * POINTS_PER_INCH,
            height: 11.0 * POINTS_PER_INCH,
            margins: Margins::default(),
            font_family: "Courier".to_string(),
            font_size: 12.0,
            page_numbers: true,
        }
    }

    pub fn body_width(&self) -> f32 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn body_height(&self) -> f32 {
        (self.height - self.margins.top - self.margins.bottom).max(0.0)
    }

    /// Footer text for a 1-based page number
    pub fn footer_label(page: usize) -> String {
        format!("{}.", page)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

//! # Fixed-Pitch Text Backend
//!
//! Renders an [`ExportPackage`] to plain-text pages the way a typewritten
//! script is set: 10 columns and 6 lines per inch, so a 12pt Courier page
//! maps one character cell to one column.
//!
//! Each page is the full sheet: top margin, body lines, and the bottom
//! margin carrying the right-aligned "N." footer. Pages are joined with a
//! form feed.

use crate::geometry::{PageGeometry, POINTS_PER_INCH};
use crate::layout::{Alignment, LayoutDirective};
use crate::ExportPackage;

pub const PAGE_BREAK: char = '\u{c}';

/// Options for text rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub columns_per_inch: f32,
    pub lines_per_inch: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            columns_per_inch: 10.0,
            lines_per_inch: 6.0,
        }
    }
}

/// One rendered sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPage {
    pub number: usize,
    pub lines: Vec<String>,
}

impl TextPage {
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Page frame measured in character cells
struct Frame {
    page_columns: usize,
    left: usize,
    right: usize,
    top: usize,
    bottom: usize,
    body_lines: usize,
    columns_per_inch: f32,
    page_numbers: bool,
}

impl Frame {
    fn new(geometry: &PageGeometry, options: &RenderOptions) -> Self {
        let cols = |points: f32| (points / POINTS_PER_INCH * options.columns_per_inch).round() as usize;
        let rows = |points: f32| (points / POINTS_PER_INCH * options.lines_per_inch).round() as usize;

        let page_columns = cols(geometry.width);
        let left = cols(geometry.margins.left);
        let right = page_columns.saturating_sub(cols(geometry.margins.right)).max(left + 1);
        let top = rows(geometry.margins.top);
        let bottom = rows(geometry.margins.bottom);
        let body_lines = rows(geometry.height).saturating_sub(top + bottom).max(1);

        Self {
            page_columns,
            left,
            right,
            top,
            bottom,
            body_lines,
            columns_per_inch: options.columns_per_inch,
            page_numbers: geometry.page_numbers,
        }
    }

    fn indent_columns(&self, inches: f32) -> usize {
        (inches * self.columns_per_inch).round() as usize
    }

    /// Wrapped, positioned lines for one directive
    fn lay_out(&self, directive: &LayoutDirective) -> Vec<String> {
        let left = self.left + self.indent_columns(directive.indent.inches());
        let right = self
            .right
            .saturating_sub(self.indent_columns(directive.right_indent.inches()))
            .max(left + 1);

        wrap(&directive.text(), right - left)
            .into_iter()
            .map(|line| {
                let pad = match directive.alignment {
                    Alignment::Left => left,
                    Alignment::Right => right.saturating_sub(line.chars().count()),
                };
                format!("{}{}", " ".repeat(pad), line)
            })
            .collect()
    }

    fn footer(&self, number: usize) -> String {
        let label = PageGeometry::footer_label(number);
        let pad = self.right.saturating_sub(label.chars().count());
        format!("{}{}", " ".repeat(pad), label)
    }

    /// Surround body lines with the margins and footer
    fn sheet(&self, number: usize, mut body: Vec<String>) -> TextPage {
        body.resize(self.body_lines, String::new());

        let mut lines = vec![String::new(); self.top];
        lines.extend(body);

        let mut bottom = vec![String::new(); self.bottom];
        if self.page_numbers {
            if let Some(slot) = bottom.get_mut(self.bottom / 2) {
                *slot = self.footer(number);
            }
        }
        lines.extend(bottom);

        TextPage { number, lines }
    }
}

/// Greedy word wrap; words wider than the column are hard-split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        if word.is_empty() {
            continue;
        }
        if line_len > 0 && line_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line_len += word.len();
        line.extend(word);
    }

    if line_len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Collects body lines into pages
struct PageBuilder {
    capacity: usize,
    pages: Vec<Vec<String>>,
    current: Vec<String>,
    pending_space: usize,
}

impl PageBuilder {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pages: Vec::new(),
            current: Vec::new(),
            pending_space: 0,
        }
    }

    /// Place a block. `needed` lines must fit after the gap for the block
    /// to start on the current page.
    fn place(&mut self, space_before: usize, lines: &[String], space_after: usize, needed: usize) {
        let mut gap = self.pending_space + space_before;
        let needed = needed.clamp(1, self.capacity);

        if !self.current.is_empty() && self.current.len() + gap + needed > self.capacity {
            self.break_page();
        }
        if self.current.is_empty() {
            gap = 0;
        }

        self.current.extend(std::iter::repeat(String::new()).take(gap));
        for line in lines {
            if self.current.len() >= self.capacity {
                self.break_page();
            }
            self.current.push(line.clone());
        }
        self.pending_space = space_after;
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

/// Plain-text paginating backend
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, package: &ExportPackage) -> Vec<TextPage> {
        let frame = Frame::new(&package.geometry, &self.options);
        let directives = &package.directives;
        let blocks: Vec<Vec<String>> = directives.iter().map(|d| frame.lay_out(d)).collect();

        let mut builder = PageBuilder::new(frame.body_lines);
        for (index, (directive, lines)) in directives.iter().zip(&blocks).enumerate() {
            let mut needed = lines.len();
            if directive.keep_with_next {
                if let Some(next) = directives.get(index + 1) {
                    needed += next.space_before as usize + 1;
                }
            }
            builder.place(
                directive.space_before as usize,
                lines,
                directive.space_after as usize,
                needed,
            );
        }

        let pages: Vec<TextPage> = builder
            .finish()
            .into_iter()
            .enumerate()
            .map(|(index, body)| frame.sheet(index + 1, body))
            .collect();

        tracing::debug!(
            pages = pages.len(),
            columns = frame.page_columns,
            "rendered text export"
        );
        pages
    }

    /// All pages as one string, separated by form feeds
    pub fn render_to_string(&self, package: &ExportPackage) -> String {
        let pages: Vec<String> = self.render(package).iter().map(TextPage::to_text).collect();
        let separator = format!("\n{}", PAGE_BREAK);
        pages.join(&separator)
    }
}

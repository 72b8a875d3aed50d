//! # Layout Directives
//!
//! Maps each block to one directive describing how a renderer should lay
//! it out. The mapping is pure and total: one directive per block, in
//! script order, and any type without its own layout uses the action
//! layout.
//!
//! | type          | case  | indent | right | before | after | other              |
//! |---------------|-------|--------|-------|--------|-------|--------------------|
//! | scene-heading | upper | 0      | 0     | 2      | 1     |                    |
//! | action        |       | 0      | 0     | 0      | 1     |                    |
//! | character     | upper | 2.2in  | 0     | 1      | 0     | keep with next     |
//! | dialogue      |       | 1.0in  | 1.0in | 0      | 0     |                    |
//! | parenthetical |       | 1.6in  | 0     | 0      | 0     | italic, `( … )`    |
//! | transition    | upper | 0      | 0     | 1      | 1     | bold, right-aligned|
//!
//! Spacing is counted in lines of the body font.

use screenwright_editor::{Block, Document, ElementType, TextRun};
use serde::{Deserialize, Serialize};

/// Left/right indentation step, independent of any unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentLevel {
    Flush,
    Dialogue,
    Parenthetical,
    Character,
}

impl IndentLevel {
    /// Distance from the margin in inches
    pub fn inches(self) -> f32 {
        match self {
            IndentLevel::Flush => 0.0,
            IndentLevel::Dialogue => 1.0,
            IndentLevel::Parenthetical => 1.6,
            IndentLevel::Character => 2.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    Left,
    Right,
}

/// How one block should be laid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDirective {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub segments: Vec<TextRun>,
    pub indent: IndentLevel,
    pub right_indent: IndentLevel,
    pub space_before: u32,
    pub space_after: u32,
    pub alignment: Alignment,
    pub bold: bool,
    pub italic: bool,
    pub keep_with_next: bool,
}

impl LayoutDirective {
    /// Text as it will be printed
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

struct ElementLayout {
    uppercase: bool,
    parenthesize: bool,
    indent: IndentLevel,
    right_indent: IndentLevel,
    space_before: u32,
    space_after: u32,
    alignment: Alignment,
    bold: bool,
    italic: bool,
    keep_with_next: bool,
}

const ACTION: ElementLayout = ElementLayout {
    uppercase: false,
    parenthesize: false,
    indent: IndentLevel::Flush,
    right_indent: IndentLevel::Flush,
    space_before: 0,
    space_after: 1,
    alignment: Alignment::Left,
    bold: false,
    italic: false,
    keep_with_next: false,
};

fn layout_for(element_type: &ElementType) -> ElementLayout {
    match element_type {
        ElementType::SceneHeading => ElementLayout {
            uppercase: true,
            space_before: 2,
            ..ACTION
        },
        ElementType::Character => ElementLayout {
            uppercase: true,
            indent: IndentLevel::Character,
            space_before: 1,
            space_after: 0,
            keep_with_next: true,
            ..ACTION
        },
        ElementType::Dialogue => ElementLayout {
            indent: IndentLevel::Dialogue,
            right_indent: IndentLevel::Dialogue,
            space_after: 0,
            ..ACTION
        },
        ElementType::Parenthetical => ElementLayout {
            parenthesize: true,
            indent: IndentLevel::Parenthetical,
            space_after: 0,
            italic: true,
            ..ACTION
        },
        ElementType::Transition => ElementLayout {
            uppercase: true,
            space_before: 1,
            alignment: Alignment::Right,
            bold: true,
            ..ACTION
        },
        ElementType::Action | ElementType::Legacy(_) => ACTION,
    }
}

/// Directive for a single block
pub fn transform_block(block: &Block) -> LayoutDirective {
    let layout = layout_for(&block.element_type);

    let mut segments: Vec<TextRun> = block
        .children
        .iter()
        .map(|run| {
            let mut segment = run.clone();
            if layout.uppercase {
                segment.text = segment.text.to_uppercase();
            }
            segment
        })
        .collect();

    if layout.parenthesize {
        segments.insert(0, TextRun::plain("("));
        segments.push(TextRun::plain(")"));
    }

    LayoutDirective {
        element_type: block.element_type.clone(),
        segments,
        indent: layout.indent,
        right_indent: layout.right_indent,
        space_before: layout.space_before,
        space_after: layout.space_after,
        alignment: layout.alignment,
        bold: layout.bold,
        italic: layout.italic,
        keep_with_next: layout.keep_with_next,
    }
}

/// One directive per block, in script order
pub fn transform(document: &Document) -> Vec<LayoutDirective> {
    let directives: Vec<LayoutDirective> = document.blocks().iter().map(transform_block).collect();
    tracing::debug!(directives = directives.len(), "export transform");
    directives
}

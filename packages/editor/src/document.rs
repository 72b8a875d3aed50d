//! # Screenplay Document Model
//!
//! A screenplay is an ordered list of typed blocks. Each block holds one or
//! more inline text runs carrying independent bold/italic/underline flags.
//!
//! ## Invariants
//!
//! - A document always has at least one block
//! - Every block has at least one text run (possibly empty)
//! - Block order is script order; nothing is ever re-sorted
//!
//! Mutation goes through [`crate::Mutation`], which validates these
//! invariants before touching the tree. Raw deserialization is the only way
//! to obtain a document that breaks them, and [`crate::format`] rejects
//! those at the load boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Screenplay element type of a block
///
/// The six screenplay elements form a closed set. Any other tag found in
/// persisted content (`paragraph`, `slugline`, ...) is kept verbatim in
/// `Legacy` so the document round-trips unchanged; every rule that looks at
/// element types handles `Legacy` through its default branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    Legacy(String),
}

impl ElementType {
    /// All six screenplay element types, in toolbar order
    pub const ALL: [ElementType; 6] = [
        ElementType::SceneHeading,
        ElementType::Action,
        ElementType::Character,
        ElementType::Dialogue,
        ElementType::Parenthetical,
        ElementType::Transition,
    ];

    /// Persisted tag for this type
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::SceneHeading => "scene-heading",
            ElementType::Action => "action",
            ElementType::Character => "character",
            ElementType::Dialogue => "dialogue",
            ElementType::Parenthetical => "parenthetical",
            ElementType::Transition => "transition",
            ElementType::Legacy(tag) => tag,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ElementType::Legacy(_))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "scene-heading" => ElementType::SceneHeading,
            "action" => ElementType::Action,
            "character" => ElementType::Character,
            "dialogue" => ElementType::Dialogue,
            "parenthetical" => ElementType::Parenthetical,
            "transition" => ElementType::Transition,
            _ => ElementType::Legacy(tag),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::from(tag.to_string())
    }
}

impl From<ElementType> for String {
    fn from(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Legacy(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline presentation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Underline];
}

/// The full flag set of a run, used when inserting new text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, value: bool) {
        match mark {
            Mark::Bold => self.bold = value,
            Mark::Italic => self.italic = value,
            Mark::Underline => self.underline = value,
        }
    }

    /// Copy with one flag flipped
    pub fn toggled(mut self, mark: Mark) -> Self {
        self.set(mark, !self.get(mark));
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A run of text sharing one set of flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

impl TextRun {
    /// Unstyled run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            bold: marks.bold,
            italic: marks.italic,
            underline: marks.underline,
        }
    }

    pub fn marks(&self) -> Marks {
        Marks {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }

    pub fn set_marks(&mut self, marks: Marks) {
        self.bold = marks.bold;
        self.italic = marks.italic;
        self.underline = marks.underline;
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks().get(mark)
    }

    /// Length in chars (offsets in this crate are char offsets)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One screenplay line: a typed block of inline runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub children: Vec<TextRun>,
}

impl Block {
    pub fn new(element_type: ElementType, text: impl Into<String>) -> Self {
        Self {
            element_type,
            children: vec![TextRun::plain(text)],
        }
    }

    /// Block with no text, holding the single empty run every block needs
    pub fn empty(element_type: ElementType) -> Self {
        Self::new(element_type, "")
    }

    pub fn with_runs(element_type: ElementType, children: Vec<TextRun>) -> Self {
        Self {
            element_type,
            children,
        }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.children.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.children.iter().map(TextRun::char_len).sum()
    }

    /// Flags in effect at a caret position.
    ///
    /// The run ending at (or containing) the caret wins, so typing at the
    /// end of a bold word continues in bold. At offset 0 the first run is
    /// used.
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut consumed = 0;
        for run in &self.children {
            let len = run.char_len();
            if offset > consumed && offset <= consumed + len {
                return run.marks();
            }
            consumed += len;
        }
        self.children.first().map(TextRun::marks).unwrap_or_default()
    }

    /// Split the runs at a char offset.
    ///
    /// Neither half is ever empty: a half with no text gets an empty run
    /// carrying the flags of the run at the split point.
    pub fn split_runs_at(&self, offset: usize) -> (Vec<TextRun>, Vec<TextRun>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut consumed = 0;

        for run in &self.children {
            let len = run.char_len();
            if consumed + len <= offset {
                left.push(run.clone());
            } else if consumed >= offset {
                right.push(run.clone());
            } else {
                let cut = offset - consumed;
                let head: String = run.text.chars().take(cut).collect();
                let tail: String = run.text.chars().skip(cut).collect();
                left.push(TextRun::styled(head, run.marks()));
                right.push(TextRun::styled(tail, run.marks()));
            }
            consumed += len;
        }

        let boundary = self.marks_at(offset);
        if left.is_empty() {
            left.push(TextRun::styled("", boundary));
        }
        if right.is_empty() {
            right.push(TextRun::styled("", boundary));
        }
        (left, right)
    }

    /// Merge adjacent runs with identical flags and drop empty runs,
    /// keeping one run when the block has no text at all.
    pub fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.children.len());
        for run in self.children.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.marks() == run.marks() => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        if merged.is_empty() {
            merged.push(TextRun::default());
        }
        self.children = merged;
    }
}

/// A caret position: block index plus char offset inside that block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus pair; collapsed when both are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Earlier point in document order
    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    /// Later point in document order
    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }
}

/// Ordered sequence of screenplay blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    blocks: Vec<Block>,
}

/// Text seeded into a project whose stored content is null
pub const STARTER_TEXT: &str = "INT. START HERE";

impl Document {
    /// Fresh document: one empty scene heading
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty(ElementType::SceneHeading)],
        }
    }

    /// Seed document for a project with no stored content
    pub fn starter() -> Self {
        Self {
            blocks: vec![Block::new(ElementType::SceneHeading, STARTER_TEXT)],
        }
    }

    /// Build from blocks without validation.
    ///
    /// Use [`crate::format::validate`] (or the `format` loaders) when the
    /// blocks come from outside the process.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True only for a document that bypassed validation
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the whole script, one line per block
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Element types in script order
    pub fn types(&self) -> Vec<ElementType> {
        self.blocks
            .iter()
            .map(|block| block.element_type.clone())
            .collect()
    }

    /// Caret at the very start of the script
    pub fn start_point(&self) -> Point {
        Point::new(0, 0)
    }

    /// Caret after the last char of the last block
    pub fn end_point(&self) -> Point {
        match self.blocks.len() {
            0 => Point::new(0, 0),
            len => Point::new(len - 1, self.blocks[len - 1].char_len()),
        }
    }

    /// Pull a point back inside the document
    pub fn clamp_point(&self, point: Point) -> Point {
        match self.blocks.get(point.block) {
            Some(block) => Point::new(point.block, point.offset.min(block.char_len())),
            None => self.end_point(),
        }
    }

    /// Re-tag a block, leaving its runs untouched. Returns the previous type.
    pub fn set_type(&mut self, index: usize, element_type: ElementType) -> Option<ElementType> {
        let block = self.blocks.get_mut(index)?;
        Some(std::mem::replace(&mut block.element_type, element_type))
    }

    /// Whether every run overlapping `[start, end)` carries `mark`.
    ///
    /// Runs are only counted when they share at least one char with the
    /// range. An empty range reports the flags at the caret.
    pub fn mark_active(&self, start: Point, end: Point, mark: Mark) -> bool {
        if start >= end {
            return self
                .block(start.block)
                .map(|block| block.marks_at(start.offset).get(mark))
                .unwrap_or(false);
        }

        let mut covered_any = false;
        for index in start.block..=end.block.min(self.blocks.len().saturating_sub(1)) {
            let block = &self.blocks[index];
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                block.char_len()
            };

            let mut consumed = 0;
            for run in &block.children {
                let len = run.char_len();
                let overlaps = consumed < to && consumed + len > from;
                if overlaps {
                    covered_any = true;
                    if !run.has_mark(mark) {
                        return false;
                    }
                }
                consumed += len;
            }
        }
        covered_any
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

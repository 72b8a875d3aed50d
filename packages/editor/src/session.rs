//! # Edit Session
//!
//! One open screenplay: the document, the caret/selection, undo history,
//! pending inline flags and change listeners, all owned for the lifetime
//! of the session.
//!
//! Screenplay behaviour is an explicit dispatch step in front of the
//! mutation primitive rather than an override of it:
//!
//! ```text
//! Enter → classify::next_on_break(current) → SplitBlock → SetType(new block)
//! Tab   → classify::cycle(current)         → SetType(current) | no-op
//! ```
//!
//! Every effective change is one undo step and fires the change listeners
//! once. Operations that change nothing fire nothing.

use crate::classify;
use crate::document::{Block, Document, ElementType, Mark, Marks, Point, Selection};
use crate::errors::EditorError;
use crate::format;
use crate::mutations::{Mutation, MutationError};
use crate::undo_stack::UndoStack;

/// Whether an operation changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
}

impl EditOutcome {
    pub fn is_changed(self) -> bool {
        self == EditOutcome::Changed
    }
}

/// Editor keys the session knows how to dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Backspace,
    Char(char),
    Bold,
    Italic,
    Underline,
    Undo,
    Redo,
    Other(String),
}

/// Whether a key event was consumed or should fall through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandling {
    Consumed,
    Ignored,
}

type ChangeListener = Box<dyn FnMut(&Document) + Send>;

/// Editing state for one open screenplay
pub struct EditSession {
    document: Document,
    selection: Option<Selection>,
    history: UndoStack,
    pending_marks: Option<Marks>,
    version: u64,
    listeners: Vec<ChangeListener>,
}

impl EditSession {
    /// Open a session over a document with the caret at its end
    pub fn new(document: Document) -> Self {
        let selection = if document.is_empty() {
            None
        } else {
            Some(Selection::collapsed(document.end_point()))
        };

        Self {
            document,
            selection,
            history: UndoStack::new(),
            pending_marks: None,
            version: 0,
            listeners: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Number of effective changes since the session opened
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when the document has no blocks and edits are being ignored.
    /// The owner should reload the last known-good persisted content.
    pub fn needs_rehydrate(&self) -> bool {
        self.document.is_empty()
    }

    /// Register a listener called once after every effective change
    pub fn on_change(&mut self, listener: impl FnMut(&Document) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the selection. Pending flags are dropped.
    pub fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
        self.pending_marks = None;
    }

    /// Collapse the selection to a caret
    pub fn collapse_to(&mut self, point: Point) {
        self.select(Selection::collapsed(point));
    }

    pub fn select_all(&mut self) {
        let selection = Selection::range(self.document.start_point(), self.document.end_point());
        self.select(selection);
    }

    pub fn deselect(&mut self) {
        self.selection = None;
        self.pending_marks = None;
    }

    /// Selection, only if both ends land inside the document
    fn resolved_selection(&self) -> Option<Selection> {
        let selection = self.selection?;
        let resolves = |point: Point| {
            self.document
                .block(point.block)
                .is_some_and(|block| point.offset <= block.char_len())
        };
        (resolves(selection.anchor) && resolves(selection.focus)).then_some(selection)
    }

    /// Selection pulled back inside the document
    fn clamped_selection(&self) -> Option<Selection> {
        if self.document.is_empty() {
            return None;
        }
        let selection = self.selection?;
        Some(Selection::range(
            self.document.clamp_point(selection.anchor),
            self.document.clamp_point(selection.focus),
        ))
    }

    /// Index of the block holding the start of the selection
    pub fn current_block(&self) -> Option<usize> {
        self.resolved_selection().map(|selection| selection.start().block)
    }

    pub fn current_type(&self) -> Option<&ElementType> {
        self.current_block()
            .and_then(|index| self.document.block(index))
            .map(|block| &block.element_type)
    }

    /// Flags that the next typed text will get, or that cover the whole
    /// selection when it is expanded
    pub fn active_marks(&self) -> Marks {
        if let Some(marks) = self.pending_marks {
            return marks;
        }
        let Some(selection) = self.clamped_selection() else {
            return Marks::default();
        };

        let mut marks = Marks::default();
        for mark in Mark::ALL {
            marks.set(
                mark,
                self.document
                    .mark_active(selection.start(), selection.end(), mark),
            );
        }
        marks
    }

    /// Paragraph break.
    ///
    /// The new block's type is decided from the current block before the
    /// split, then applied to the block the split creates. When the
    /// selection no longer resolves to a block the split still happens at
    /// the nearest valid point, with no type assignment.
    pub fn insert_break(&mut self) -> EditOutcome {
        let Some(selection) = self.clamped_selection() else {
            return EditOutcome::Unchanged;
        };

        let next_type = self
            .current_type()
            .map(classify::next_on_break);
        tracing::debug!(next_type = ?next_type, "paragraph break");

        self.commit("Insert break", |session| {
            let start = selection.start();
            if !selection.is_collapsed() {
                session.delete_range(start, selection.end())?;
            }

            session.push(Mutation::SplitBlock { at: start })?;

            let new_block = start.block + 1;
            if let Some(element_type) = next_type {
                let inherited = session
                    .document
                    .block(new_block)
                    .map(|block| &block.element_type);
                if inherited != Some(&element_type) {
                    session.push(Mutation::SetType {
                        block: new_block,
                        element_type,
                    })?;
                }
            }

            session.selection = Some(Selection::collapsed(Point::new(new_block, 0)));
            Ok(())
        })
    }

    /// Advance the current block along the cycle table.
    ///
    /// A fixed point (scene heading, legacy tags) is a true no-op.
    pub fn cycle_type(&mut self) -> EditOutcome {
        let Some(index) = self.current_block() else {
            return EditOutcome::Unchanged;
        };
        let current = self.document.blocks()[index].element_type.clone();
        let next = classify::cycle(&current);

        if next == current {
            tracing::debug!(element_type = %current, "cycle is a fixed point");
            return EditOutcome::Unchanged;
        }

        tracing::debug!(from = %current, to = %next, "cycle type");
        self.commit("Cycle type", |session| {
            session.push(Mutation::SetType {
                block: index,
                element_type: next,
            })
        })
    }

    /// Re-tag every block touched by the selection
    pub fn set_block_type(&mut self, element_type: ElementType) -> EditOutcome {
        let Some(selection) = self.clamped_selection() else {
            return EditOutcome::Unchanged;
        };

        self.commit("Set type", |session| {
            for index in selection.start().block..=selection.end().block {
                if session.document.blocks()[index].element_type != element_type {
                    session.push(Mutation::SetType {
                        block: index,
                        element_type: element_type.clone(),
                    })?;
                }
            }
            Ok(())
        })
    }

    /// Flip one inline flag.
    ///
    /// With an expanded selection the flag is cleared when every covered
    /// run already has it and set otherwise; the other two flags are never
    /// touched. With a caret the flip is held as a pending flag for the
    /// next typed text.
    pub fn toggle_mark(&mut self, mark: Mark) -> EditOutcome {
        let Some(selection) = self.clamped_selection() else {
            return EditOutcome::Unchanged;
        };

        if selection.is_collapsed() {
            self.pending_marks = Some(self.active_marks().toggled(mark));
            return EditOutcome::Unchanged;
        }

        let (start, end) = (selection.start(), selection.end());
        let value = !self.document.mark_active(start, end, mark);

        self.commit("Toggle mark", |session| {
            for index in start.block..=end.block {
                let len = session
                    .document
                    .block(index)
                    .map(Block::char_len)
                    .ok_or(MutationError::BlockNotFound(index))?;
                let from = if index == start.block { start.offset } else { 0 };
                let to = if index == end.block { end.offset } else { len };
                if from < to {
                    session.push(Mutation::SetMark {
                        block: index,
                        start: from,
                        end: to,
                        mark,
                        value,
                    })?;
                }
            }
            Ok(())
        })
    }

    /// Type text at the caret, replacing an expanded selection
    pub fn insert_text(&mut self, text: &str) -> EditOutcome {
        if text.is_empty() {
            return EditOutcome::Unchanged;
        }
        let Some(selection) = self.clamped_selection() else {
            return EditOutcome::Unchanged;
        };

        let start = selection.start();
        let marks = self.pending_marks.unwrap_or_else(|| {
            self.document
                .block(start.block)
                .map(|block| block.marks_at(start.offset))
                .unwrap_or_default()
        });

        let outcome = self.commit("Insert text", |session| {
            if !selection.is_collapsed() {
                session.delete_range(start, selection.end())?;
            }
            session.push(Mutation::InsertText {
                at: start,
                text: text.to_string(),
                marks,
            })?;
            session.selection = Some(Selection::collapsed(Point::new(
                start.block,
                start.offset + text.chars().count(),
            )));
            Ok(())
        });

        if outcome.is_changed() {
            self.pending_marks = None;
        }
        outcome
    }

    /// Backspace: delete the selection, the char before the caret, or merge
    /// into the previous block at the start of a line
    pub fn delete_backward(&mut self) -> EditOutcome {
        let Some(selection) = self.clamped_selection() else {
            return EditOutcome::Unchanged;
        };

        if !selection.is_collapsed() {
            return self.commit("Delete selection", |session| {
                session.delete_range(selection.start(), selection.end())
            });
        }

        let at = selection.start();
        if at.offset > 0 {
            self.commit("Delete backward", |session| {
                session.push(Mutation::RemoveText {
                    block: at.block,
                    start: at.offset - 1,
                    end: at.offset,
                })?;
                session.selection = Some(Selection::collapsed(Point::new(at.block, at.offset - 1)));
                Ok(())
            })
        } else if at.block > 0 {
            let previous = at.block - 1;
            let joint = self.document.blocks()[previous].char_len();
            self.commit("Join lines", |session| {
                session.push(Mutation::MergeWithNext { block: previous })?;
                session.selection = Some(Selection::collapsed(Point::new(previous, joint)));
                Ok(())
            })
        } else {
            EditOutcome::Unchanged
        }
    }

    pub fn undo(&mut self) -> EditOutcome {
        match self.history.undo(&mut self.document) {
            Ok(Some(batch)) => {
                let selection = batch.selection_before;
                self.after_history_move(selection);
                EditOutcome::Changed
            }
            Ok(None) => EditOutcome::Unchanged,
            Err(err) => {
                tracing::error!(error = %err, "undo failed");
                EditOutcome::Unchanged
            }
        }
    }

    pub fn redo(&mut self) -> EditOutcome {
        match self.history.redo(&mut self.document) {
            Ok(Some(batch)) => {
                let selection = batch.selection_after;
                self.after_history_move(selection);
                EditOutcome::Changed
            }
            Ok(None) => EditOutcome::Unchanged,
            Err(err) => {
                tracing::error!(error = %err, "redo failed");
                EditOutcome::Unchanged
            }
        }
    }

    fn after_history_move(&mut self, selection: Option<Selection>) {
        self.selection = selection;
        self.pending_marks = None;
        self.changed();
    }

    /// Adopt freshly loaded content wholesale.
    ///
    /// Undo/redo history is cleared so the load cannot be undone back into
    /// whatever was open before. An invalid document is rejected and the
    /// current one is kept unchanged.
    pub fn load(&mut self, document: Document) -> Result<(), EditorError> {
        format::validate(&document)?;

        tracing::debug!(blocks = document.len(), "loading document into session");
        self.document = document;
        self.history.clear();
        self.selection = Some(Selection::collapsed(self.document.start_point()));
        self.pending_marks = None;
        self.changed();
        Ok(())
    }

    /// Parse and adopt persisted JSON content
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        let document = format::parse_document(json)?;
        self.load(document)
    }

    /// Route a key to its command.
    ///
    /// Tab is always consumed, even when there is nothing to cycle, so it
    /// never falls through to focus navigation or tab insertion.
    pub fn handle_key(&mut self, key: Key) -> KeyHandling {
        match key {
            Key::Enter => {
                self.insert_break();
            }
            Key::Tab => {
                self.cycle_type();
            }
            Key::Backspace => {
                self.delete_backward();
            }
            Key::Char(c) => {
                let mut buffer = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buffer));
            }
            Key::Bold => {
                self.toggle_mark(Mark::Bold);
            }
            Key::Italic => {
                self.toggle_mark(Mark::Italic);
            }
            Key::Underline => {
                self.toggle_mark(Mark::Underline);
            }
            Key::Undo => {
                self.undo();
            }
            Key::Redo => {
                self.redo();
            }
            Key::Other(name) => {
                tracing::trace!(key = %name, "key not handled");
                return KeyHandling::Ignored;
            }
        }
        KeyHandling::Consumed
    }

    /// Run an edit as one undo step, rolling it back if any mutation fails
    fn commit<F>(&mut self, description: &str, edit: F) -> EditOutcome
    where
        F: FnOnce(&mut Self) -> Result<(), MutationError>,
    {
        if self.document.is_empty() {
            tracing::warn!(operation = description, "document has no blocks, ignoring edit");
            return EditOutcome::Unchanged;
        }

        let before = self.selection;
        self.history.begin_batch(before);
        self.history.set_batch_description(description);

        match edit(self) {
            Ok(()) => {
                if self.history.end_batch(self.selection) {
                    self.changed();
                    EditOutcome::Changed
                } else {
                    EditOutcome::Unchanged
                }
            }
            Err(err) => {
                tracing::warn!(operation = description, error = %err, "edit rejected");
                if let Err(err) = self.history.abort_batch(&mut self.document) {
                    tracing::error!(error = %err, "rollback failed");
                }
                self.selection = before;
                EditOutcome::Unchanged
            }
        }
    }

    fn push(&mut self, mutation: Mutation) -> Result<(), MutationError> {
        tracing::trace!(mutation = mutation.name(), "apply");
        self.history.apply(&mutation, &mut self.document)
    }

    /// Remove everything between two points, joining their blocks
    fn delete_range(&mut self, start: Point, end: Point) -> Result<(), MutationError> {
        if start.block == end.block {
            if start.offset < end.offset {
                self.push(Mutation::RemoveText {
                    block: start.block,
                    start: start.offset,
                    end: end.offset,
                })?;
            }
        } else {
            if end.offset > 0 {
                self.push(Mutation::RemoveText {
                    block: end.block,
                    start: 0,
                    end: end.offset,
                })?;
            }

            let between = end.block - start.block - 1;
            if between > 0 {
                self.push(Mutation::Splice {
                    index: start.block + 1,
                    remove: between,
                    insert: Vec::new(),
                })?;
            }

            let len = self.document.blocks()[start.block].char_len();
            if start.offset < len {
                self.push(Mutation::RemoveText {
                    block: start.block,
                    start: start.offset,
                    end: len,
                })?;
            }

            self.push(Mutation::MergeWithNext { block: start.block })?;
        }

        self.selection = Some(Selection::collapsed(start));
        Ok(())
    }

    fn changed(&mut self) {
        self.version += 1;
        for listener in self.listeners.iter_mut() {
            listener(&self.document);
        }
    }
}

//! Edit history.
//!
//! Every command the session runs is recorded as one [`MutationBatch`]:
//! the forward mutations, their inverses (newest first) and the selection
//! on either side. A paragraph break is a split plus a re-tag, so it
//! undoes in a single step.
//!
//! ```rust
//! use screenwright_editor::{Document, ElementType, Mutation, UndoStack};
//!
//! let mut doc = Document::new();
//! let mut stack = UndoStack::new();
//!
//! let mutation = Mutation::SetType { block: 0, element_type: ElementType::Action };
//! stack.apply(&mutation, &mut doc).unwrap();
//! assert_eq!(doc.types(), vec![ElementType::Action]);
//!
//! stack.undo(&mut doc).unwrap();
//! assert_eq!(doc.types(), vec![ElementType::SceneHeading]);
//! ```

use crate::document::{Document, Selection};
use crate::mutations::{Mutation, MutationError};
use std::collections::VecDeque;

const DEFAULT_DEPTH: usize = 100;

/// One undo step
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    pub mutations: Vec<Mutation>,

    /// Inverses, newest first
    pub inverses: Vec<Mutation>,

    pub description: Option<String>,
    pub selection_before: Option<Selection>,
    pub selection_after: Option<Selection>,
}

impl MutationBatch {
    fn record(&mut self, mutation: &Mutation, inverse: Mutation) {
        self.mutations.push(mutation.clone());
        self.inverses.insert(0, inverse);
    }

    fn revert(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.inverses.iter().try_for_each(|inverse| inverse.apply(doc))
    }

    fn replay(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.mutations.iter().try_for_each(|mutation| mutation.apply(doc))
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

#[derive(Debug)]
pub struct UndoStack {
    done: VecDeque<MutationBatch>,
    undone: Vec<MutationBatch>,

    /// Oldest steps are dropped past this depth; 0 keeps everything
    depth: usize,

    recording: Option<MutationBatch>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            depth,
            recording: None,
        }
    }

    /// Apply a mutation, recording its inverse.
    ///
    /// Outside a batch the mutation becomes its own undo step.
    pub fn apply(&mut self, mutation: &Mutation, doc: &mut Document) -> Result<(), MutationError> {
        let inverse = mutation.to_inverse(doc)?;
        mutation.apply(doc)?;

        match &mut self.recording {
            Some(batch) => batch.record(mutation, inverse),
            None => {
                let mut batch = MutationBatch::default();
                batch.record(mutation, inverse);
                self.commit(batch);
            }
        }
        Ok(())
    }

    pub fn begin_batch(&mut self, selection_before: Option<Selection>) {
        self.recording = Some(MutationBatch {
            selection_before,
            ..MutationBatch::default()
        });
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.recording {
            batch.description = Some(description.into());
        }
    }

    /// Close the open batch. Returns false (and records nothing) when it
    /// holds no mutations.
    pub fn end_batch(&mut self, selection_after: Option<Selection>) -> bool {
        let Some(mut batch) = self.recording.take() else {
            return false;
        };
        if batch.is_empty() {
            return false;
        }
        batch.selection_after = selection_after;
        self.commit(batch);
        true
    }

    /// Revert whatever the open batch applied and discard it
    pub fn abort_batch(&mut self, doc: &mut Document) -> Result<(), MutationError> {
        match self.recording.take() {
            Some(batch) => batch.revert(doc),
            None => Ok(()),
        }
    }

    fn commit(&mut self, batch: MutationBatch) {
        self.done.push_back(batch);
        if self.depth > 0 && self.done.len() > self.depth {
            self.done.pop_front();
        }
        self.undone.clear();
    }

    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<&MutationBatch>, MutationError> {
        let Some(batch) = self.done.pop_back() else {
            return Ok(None);
        };
        batch.revert(doc)?;
        self.undone.push(batch);
        Ok(self.undone.last())
    }

    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<&MutationBatch>, MutationError> {
        let Some(batch) = self.undone.pop() else {
            return Ok(None);
        };
        batch.replay(doc)?;
        self.done.push_back(batch);
        Ok(self.done.back())
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Step the next undo would revert
    pub fn peek_undo(&self) -> Option<&MutationBatch> {
        self.done.back()
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Forget all history, including an open batch
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
        self.recording = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementType, Marks, Point};

    fn insert(at: usize, text: &str) -> Mutation {
        Mutation::InsertText {
            at: Point::new(0, at),
            text: text.to_string(),
            marks: Marks::default(),
        }
    }

    #[test]
    fn test_fresh_stack_is_empty() {
        let stack = UndoStack::new();
        assert!(stack.is_empty());
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo_single_mutation() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        stack.apply(&insert(0, "EXT. BEACH"), &mut doc).unwrap();
        assert_eq!(doc.text(), "EXT. BEACH");

        assert!(stack.undo(&mut doc).unwrap().is_some());
        assert_eq!(doc, Document::new());
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc).unwrap().is_some());
        assert_eq!(doc.text(), "EXT. BEACH");
        assert_eq!(stack.len(), 1);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_undoes_in_one_step() {
        let mut doc = Document::starter();
        let mut stack = UndoStack::new();

        stack.begin_batch(None);
        stack.set_batch_description("break");
        stack
            .apply(&Mutation::SplitBlock { at: Point::new(0, 15) }, &mut doc)
            .unwrap();
        stack
            .apply(
                &Mutation::SetType {
                    block: 1,
                    element_type: ElementType::Character,
                },
                &mut doc,
            )
            .unwrap();
        assert!(stack.end_batch(None));

        assert_eq!(stack.len(), 1);
        assert_eq!(
            stack.peek_undo().and_then(|b| b.description.as_deref()),
            Some("break")
        );

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc, Document::starter());
    }

    #[test]
    fn test_empty_batch_is_not_recorded() {
        let mut stack = UndoStack::new();
        stack.begin_batch(None);
        assert!(!stack.end_batch(None));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_abort_batch_rolls_back() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        stack.begin_batch(None);
        stack.apply(&insert(0, "CUT TO:"), &mut doc).unwrap();
        stack.abort_batch(&mut doc).unwrap();

        assert_eq!(doc, Document::new());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_edit_drops_redo() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        stack.apply(&insert(0, "World"), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert!(stack.can_redo());

        stack.apply(&insert(0, "Everyone"), &mut doc).unwrap();
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_depth_drops_oldest() {
        let mut doc = Document::new();
        let mut stack = UndoStack::with_depth(2);

        for i in 0..3 {
            stack.apply(&insert(0, &format!("Text {}", i)), &mut doc).unwrap();
        }

        assert_eq!(stack.len(), 2);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.text(), "Text 0");
    }
}

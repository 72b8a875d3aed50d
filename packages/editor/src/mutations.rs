//! # Document Mutations
//!
//! The editing primitive: every change to a [`Document`] is one of these
//! operations. Each mutation validates before it touches the tree and can
//! produce its own inverse, which is what the undo stack records.
//!
//! ## Semantics
//!
//! ### InsertText / RemoveText
//! - Offsets are char offsets inside one block
//! - Inserted text gets the given flags; touched runs are normalized
//!
//! ### SplitBlock
//! - The new block goes right after the split block and copies its type
//! - Both halves keep at least one run
//!
//! ### MergeWithNext
//! - Appends the next block's runs and removes it; the surviving block
//!   keeps its own type
//!
//! ### SetType
//! - Only the tag changes, runs are left byte-for-byte intact
//!
//! ### Splice
//! - Replaces a range of whole blocks; used for inverses and bulk edits
//! - Refused when it would leave the document empty

use crate::document::{Block, Document, ElementType, Mark, Marks, Point, TextRun};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural edit of a screenplay document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert text at a caret position with the given flags
    InsertText {
        at: Point,
        text: String,
        marks: Marks,
    },

    /// Remove the chars in `[start, end)` of one block
    RemoveText {
        block: usize,
        start: usize,
        end: usize,
    },

    /// Split a block in two at a caret position
    SplitBlock {
        at: Point,
    },

    /// Join a block with the one after it
    MergeWithNext {
        block: usize,
    },

    /// Re-tag a block
    SetType {
        block: usize,
        element_type: ElementType,
    },

    /// Set one flag on the chars in `[start, end)` of one block
    SetMark {
        block: usize,
        start: usize,
        end: usize,
        mark: Mark,
        value: bool,
    },

    /// Replace `remove` blocks starting at `index` with `insert`
    Splice {
        index: usize,
        remove: usize,
        insert: Vec<Block>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(usize),

    #[error("Offset {offset} out of range for block {block} (length {len})")]
    OffsetOutOfRange {
        block: usize,
        offset: usize,
        len: usize,
    },

    #[error("Invalid range {start}..{end} in block {block}")]
    InvalidRange {
        block: usize,
        start: usize,
        end: usize,
    },

    #[error("Block {0} has no following block to merge")]
    NoNextBlock(usize),

    #[error("Cannot remove the last block of a document")]
    LastBlock,

    #[error("Block {0} has no text runs")]
    EmptyChildren(usize),
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertText { at, text, marks } => {
                Self::apply_insert_text(doc, *at, text, *marks)
            }

            Mutation::RemoveText { block, start, end } => {
                Self::apply_remove_text(doc, *block, *start, *end)
            }

            Mutation::SplitBlock { at } => Self::apply_split(doc, *at),

            Mutation::MergeWithNext { block } => Self::apply_merge(doc, *block),

            Mutation::SetType {
                block,
                element_type,
            } => {
                doc.set_type(*block, element_type.clone())
                    .ok_or(MutationError::BlockNotFound(*block))?;
                Ok(())
            }

            Mutation::SetMark {
                block,
                start,
                end,
                mark,
                value,
            } => Self::apply_set_mark(doc, *block, *start, *end, *mark, *value),

            Mutation::Splice {
                index,
                remove,
                insert,
            } => {
                doc.blocks_mut()
                    .splice(*index..*index + *remove, insert.iter().cloned());
                Ok(())
            }
        }
    }

    fn apply_insert_text(
        doc: &mut Document,
        at: Point,
        text: &str,
        marks: Marks,
    ) -> Result<(), MutationError> {
        let block = doc
            .block_mut(at.block)
            .ok_or(MutationError::BlockNotFound(at.block))?;

        let (mut left, right) = block.split_runs_at(at.offset);
        left.push(TextRun::styled(text, marks));
        left.extend(right);
        block.children = left;
        block.normalize();
        Ok(())
    }

    fn apply_remove_text(
        doc: &mut Document,
        index: usize,
        start: usize,
        end: usize,
    ) -> Result<(), MutationError> {
        let block = doc
            .block_mut(index)
            .ok_or(MutationError::BlockNotFound(index))?;

        let (left, rest) = block.split_runs_at(start);
        let tail = Block::with_runs(block.element_type.clone(), rest);
        let (_, right) = tail.split_runs_at(end - start);

        let mut children = left;
        children.extend(right);
        block.children = children;
        block.normalize();
        Ok(())
    }

    fn apply_split(doc: &mut Document, at: Point) -> Result<(), MutationError> {
        let block = doc
            .block(at.block)
            .ok_or(MutationError::BlockNotFound(at.block))?;

        let (left, right) = block.split_runs_at(at.offset);
        let element_type = block.element_type.clone();

        let blocks = doc.blocks_mut();
        blocks[at.block].children = left;
        blocks.insert(at.block + 1, Block::with_runs(element_type, right));
        Ok(())
    }

    fn apply_merge(doc: &mut Document, index: usize) -> Result<(), MutationError> {
        let blocks = doc.blocks_mut();
        let next = blocks.remove(index + 1);
        let block = &mut blocks[index];
        block.children.extend(next.children);
        block.normalize();
        Ok(())
    }

    fn apply_set_mark(
        doc: &mut Document,
        index: usize,
        start: usize,
        end: usize,
        mark: Mark,
        value: bool,
    ) -> Result<(), MutationError> {
        let block = doc
            .block_mut(index)
            .ok_or(MutationError::BlockNotFound(index))?;

        let (left, rest) = block.split_runs_at(start);
        let tail = Block::with_runs(block.element_type.clone(), rest);
        let (mut middle, right) = tail.split_runs_at(end - start);

        for run in &mut middle {
            let mut marks = run.marks();
            marks.set(mark, value);
            run.set_marks(marks);
        }

        let mut children = left;
        children.extend(middle);
        children.extend(right);
        block.children = children;
        block.normalize();
        Ok(())
    }

    /// Build the mutation that undoes this one.
    ///
    /// Must be called before `apply`, against the document the mutation is
    /// about to be applied to.
    pub fn to_inverse(&self, doc: &Document) -> Result<Mutation, MutationError> {
        self.validate(doc)?;

        let snapshot = |index: usize, count: usize| -> Vec<Block> {
            doc.blocks()[index..index + count].to_vec()
        };

        let inverse = match self {
            Mutation::InsertText { at, text, .. } => Mutation::RemoveText {
                block: at.block,
                start: at.offset,
                end: at.offset + text.chars().count(),
            },

            Mutation::RemoveText { block, .. } | Mutation::SetMark { block, .. } => {
                Mutation::Splice {
                    index: *block,
                    remove: 1,
                    insert: snapshot(*block, 1),
                }
            }

            Mutation::SplitBlock { at } => Mutation::Splice {
                index: at.block,
                remove: 2,
                insert: snapshot(at.block, 1),
            },

            Mutation::MergeWithNext { block } => Mutation::Splice {
                index: *block,
                remove: 1,
                insert: snapshot(*block, 2),
            },

            Mutation::SetType { block, .. } => Mutation::SetType {
                block: *block,
                element_type: doc.blocks()[*block].element_type.clone(),
            },

            Mutation::Splice {
                index,
                remove,
                insert,
            } => Mutation::Splice {
                index: *index,
                remove: insert.len(),
                insert: snapshot(*index, *remove),
            },
        };

        Ok(inverse)
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertText { at, .. } | Mutation::SplitBlock { at } => {
                Self::check_offset(doc, at.block, at.offset)
            }

            Mutation::RemoveText { block, start, end }
            | Mutation::SetMark {
                block, start, end, ..
            } => {
                Self::check_offset(doc, *block, *end)?;
                if start > end {
                    return Err(MutationError::InvalidRange {
                        block: *block,
                        start: *start,
                        end: *end,
                    });
                }
                Ok(())
            }

            Mutation::MergeWithNext { block } => {
                doc.block(*block)
                    .ok_or(MutationError::BlockNotFound(*block))?;
                if *block + 1 >= doc.len() {
                    return Err(MutationError::NoNextBlock(*block));
                }
                Ok(())
            }

            Mutation::SetType { block, .. } => {
                doc.block(*block)
                    .ok_or(MutationError::BlockNotFound(*block))?;
                Ok(())
            }

            Mutation::Splice {
                index,
                remove,
                insert,
            } => {
                if *index + *remove > doc.len() {
                    return Err(MutationError::BlockNotFound(*index + *remove - 1));
                }
                if let Some(position) = insert.iter().position(|b| b.children.is_empty()) {
                    return Err(MutationError::EmptyChildren(*index + position));
                }
                if doc.len() - *remove + insert.len() == 0 {
                    return Err(MutationError::LastBlock);
                }
                Ok(())
            }
        }
    }

    fn check_offset(doc: &Document, block: usize, offset: usize) -> Result<(), MutationError> {
        let len = doc
            .block(block)
            .ok_or(MutationError::BlockNotFound(block))?
            .char_len();
        if offset > len {
            return Err(MutationError::OffsetOutOfRange { block, offset, len });
        }
        Ok(())
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertText { .. } => "insert_text",
            Mutation::RemoveText { .. } => "remove_text",
            Mutation::SplitBlock { .. } => "split_block",
            Mutation::MergeWithNext { .. } => "merge_with_next",
            Mutation::SetType { .. } => "set_type",
            Mutation::SetMark { .. } => "set_mark",
            Mutation::Splice { .. } => "splice",
        }
    }
}

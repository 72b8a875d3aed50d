//! # Screenwright Editor
//!
//! Core screenplay editing engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ session: keys and commands                  │
//! │  - Enter → classify::next_on_break          │
//! │  - Tab   → classify::cycle                  │
//! │  - typing, backspace, flags, undo/redo      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations + undo_stack: the edit primitive  │
//! │  - validate, apply, record inverse          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: typed blocks of styled text runs  │
//! │ format: JSON list of blocks, `.screenplay`  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use screenwright_editor::{Document, EditSession, ElementType};
//!
//! let mut session = EditSession::new(Document::starter());
//!
//! session.insert_break();
//! session.insert_text("JOHN");
//! session.insert_break();
//! session.insert_text("Where were you?");
//!
//! assert_eq!(
//!     session.document().types(),
//!     vec![ElementType::SceneHeading, ElementType::Character, ElementType::Dialogue]
//! );
//! ```

pub mod classify;
mod document;
mod errors;
pub mod format;
mod mutations;
mod session;
mod undo_stack;

pub use document::{
    Block, Document, ElementType, Mark, Marks, Point, Selection, TextRun, STARTER_TEXT,
};
pub use errors::EditorError;
pub use format::FormatError;
pub use mutations::{Mutation, MutationError};
pub use session::{EditOutcome, EditSession, Key, KeyHandling};
pub use undo_stack::{MutationBatch, UndoStack};

//! # Screenwright Workspace
//!
//! Keeps open screenplays in sync with the project store.
//!
//! - [`store`]: the remote store contract and two implementations
//! - [`loader`]: open/create/import policy, including the blocking
//!   behaviour on read failure
//! - [`autosave`]: debounced writes with a published save status

pub mod autosave;
pub mod loader;
pub mod store;

pub use autosave::{AutoSaver, SaveError, SaveStatus, DEFAULT_DEBOUNCE};
pub use loader::{LoadError, OpenedProject, ProjectLoader, DEFAULT_TITLE};
pub use store::{
    ContentWrite, DirectoryStore, FetchedProject, MemoryStore, NewProject, ProjectId,
    ProjectRecord, RemoteStore, StoreError,
};

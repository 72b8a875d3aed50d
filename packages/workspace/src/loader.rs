//! Opening, creating and importing projects.
//!
//! A failed remote read never turns into an empty document: the caller
//! gets [`LoadError::Remote`] and must not open an editor over it.

use crate::store::{NewProject, ProjectId, RemoteStore, StoreError};
use screenwright_editor::{format, Document, FormatError};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Untitled Screenplay";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not read project {id}: {source}")]
    Remote {
        id: ProjectId,
        #[source]
        source: StoreError,
    },

    #[error("Project {id} has invalid content: {source}")]
    Invalid {
        id: ProjectId,
        #[source]
        source: FormatError,
    },

    #[error("Could not import {path}: {source}")]
    Import {
        path: String,
        #[source]
        source: FormatError,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] FormatError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A project ready for an edit session
#[derive(Debug, Clone)]
pub struct OpenedProject {
    pub id: ProjectId,
    pub title: String,
    pub document: Document,

    /// Stored content was null and the starter document was used
    pub seeded: bool,
}

pub struct ProjectLoader;

impl ProjectLoader {
    pub async fn open(store: &dyn RemoteStore, id: ProjectId) -> Result<OpenedProject, LoadError> {
        let fetched = store.fetch(id).await.map_err(|source| {
            tracing::warn!(project = %id, error = %source, "remote read failed");
            LoadError::Remote { id, source }
        })?;

        let (document, seeded) = match fetched.content {
            None | Some(serde_json::Value::Null) => (Document::starter(), true),
            Some(value) => {
                let document = format::from_value(value)
                    .map_err(|source| LoadError::Invalid { id, source })?;
                (document, false)
            }
        };

        tracing::debug!(project = %id, blocks = document.len(), seeded, "opened project");
        Ok(OpenedProject {
            id,
            title: fetched.title,
            document,
            seeded,
        })
    }

    /// Insert a new project holding a fresh document
    pub async fn create(
        store: &dyn RemoteStore,
        title: Option<&str>,
        owner: Option<&str>,
    ) -> Result<ProjectId, LoadError> {
        let content = format::to_value(&Document::new())?;

        let id = store
            .insert(NewProject {
                title: title.unwrap_or(DEFAULT_TITLE).to_string(),
                content,
                owner: owner.map(str::to_string),
            })
            .await?;

        tracing::info!(project = %id, "created project");
        Ok(id)
    }

    /// Insert a screenplay file as a new project titled after the file
    pub async fn import(
        store: &dyn RemoteStore,
        path: &Path,
        owner: Option<&str>,
    ) -> Result<ProjectId, LoadError> {
        let import_error = |source: FormatError| LoadError::Import {
            path: path.display().to_string(),
            source,
        };

        let document = format::load_from_disk(path).map_err(import_error)?;
        let content = format::to_value(&document).map_err(import_error)?;
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let id = store
            .insert(NewProject {
                title,
                content,
                owner: owner.map(str::to_string),
            })
            .await?;

        tracing::info!(project = %id, path = %path.display(), "imported project");
        Ok(id)
    }

    pub async fn rename(store: &dyn RemoteStore, id: ProjectId, title: &str) -> Result<(), LoadError> {
        store.update_title(id, title).await?;
        Ok(())
    }

    pub async fn delete(store: &dyn RemoteStore, id: ProjectId) -> Result<(), LoadError> {
        store.delete(id).await?;
        tracing::info!(project = %id, "deleted project");
        Ok(())
    }
}

//! # Remote Project Store
//!
//! The record store that holds projects: id, title, content blob,
//! last-modified timestamp and owner. The core only ever reads and writes
//! `content` and `title`.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process map with hooks for slow and failing writes
//! - [`DirectoryStore`]: one JSON record per project under a root directory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Full project record as kept by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub title: String,
    pub content: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<String>,
}

/// What `fetch` hands back to the core
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedProject {
    pub title: String,
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub content: serde_json::Value,
    pub owner: Option<String>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(ProjectId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt project record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contract the persistence adapter consumes
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    async fn fetch(&self, id: ProjectId) -> Result<FetchedProject, StoreError>;

    async fn update_content(
        &self,
        id: ProjectId,
        content: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn update_title(&self, id: ProjectId, title: &str) -> Result<(), StoreError>;

    async fn insert(&self, project: NewProject) -> Result<ProjectId, StoreError>;

    async fn delete(&self, id: ProjectId) -> Result<(), StoreError>;
}

/// A content write as seen by [`MemoryStore`], in the order writes were issued
#[derive(Debug, Clone, PartialEq)]
pub struct ContentWrite {
    pub id: ProjectId,
    pub content: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// In-memory store with hooks for slow and failing calls
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<ProjectId, ProjectRecord>>,
    writes: Mutex<Vec<ContentWrite>>,
    write_delays: Mutex<VecDeque<Duration>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fetch_calls: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing `insert`
    pub async fn seed(&self, title: &str, content: Option<serde_json::Value>) -> ProjectId {
        let id = ProjectId::new();
        self.records.write().await.insert(
            id,
            ProjectRecord {
                id,
                title: title.to_string(),
                content,
                updated_at: Utc::now(),
                owner: None,
            },
        );
        id
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Delay applied to the next content write; queued delays are consumed
    /// one per write
    pub async fn push_write_delay(&self, delay: Duration) {
        self.write_delays.lock().await.push_back(delay);
    }

    /// Content writes in the order they were issued
    pub async fn writes(&self) -> Vec<ContentWrite> {
        self.writes.lock().await.clone()
    }

    pub async fn record(&self, id: ProjectId) -> Option<ProjectRecord> {
        self.records.read().await.get(&id).cloned()
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, id: ProjectId) -> Result<FetchedProject, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".to_string()));
        }

        self.records
            .read()
            .await
            .get(&id)
            .map(|record| FetchedProject {
                title: record.title.clone(),
                content: record.content.clone(),
            })
            .ok_or(StoreError::NotFound(id))
    }

    async fn update_content(
        &self,
        id: ProjectId,
        content: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.writes.lock().await.push(ContentWrite {
            id,
            content: content.clone(),
            updated_at,
        });

        let delay = self.write_delays.lock().await.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }

        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.content = Some(content);
        record.updated_at = updated_at;
        Ok(())
    }

    async fn update_title(&self, id: ProjectId, title: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.title = title.to_string();
        Ok(())
    }

    async fn insert(&self, project: NewProject) -> Result<ProjectId, StoreError> {
        let id = ProjectId::new();
        self.records.write().await.insert(
            id,
            ProjectRecord {
                id,
                title: project.title,
                content: Some(project.content),
                updated_at: Utc::now(),
                owner: project.owner,
            },
        );
        Ok(id)
    }

    async fn delete(&self, id: ProjectId) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

/// Store keeping `<root>/<id>.json` per project
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: ProjectId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    async fn read_record(&self, id: ProjectId) -> Result<ProjectRecord, StoreError> {
        let bytes = match tokio::fs::read(self.record_path(id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_record(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.record_path(record.id), json).await?;
        Ok(())
    }

    /// All records under the root, most recently updated first
    pub async fn list(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let mut records = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<ProjectRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping unreadable record"),
            }
        }

        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

#[async_trait]
impl RemoteStore for DirectoryStore {
    fn backend_tag(&self) -> &'static str {
        "directory"
    }

    async fn fetch(&self, id: ProjectId) -> Result<FetchedProject, StoreError> {
        let record = self.read_record(id).await?;
        Ok(FetchedProject {
            title: record.title,
            content: record.content,
        })
    }

    async fn update_content(
        &self,
        id: ProjectId,
        content: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut record = self.read_record(id).await?;
        record.content = Some(content);
        record.updated_at = updated_at;
        self.write_record(&record).await
    }

    async fn update_title(&self, id: ProjectId, title: &str) -> Result<(), StoreError> {
        let mut record = self.read_record(id).await?;
        record.title = title.to_string();
        self.write_record(&record).await
    }

    async fn insert(&self, project: NewProject) -> Result<ProjectId, StoreError> {
        let record = ProjectRecord {
            id: ProjectId::new(),
            title: project.title,
            content: Some(project.content),
            updated_at: Utc::now(),
            owner: project.owner,
        };
        self.write_record(&record).await?;
        tracing::debug!(id = %record.id, root = %self.root.display(), "inserted project");
        Ok(record.id)
    }

    async fn delete(&self, id: ProjectId) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene() -> serde_json::Value {
        json!([{ "type": "scene-heading", "children": [{ "text": "EXT. DOCKS - DAWN" }] }])
    }

    #[test]
    fn test_project_id_parse_and_display() {
        let id = ProjectId::new();
        let parsed: ProjectId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<ProjectId>().is_err());
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryStore::new();
        let id = store
            .insert(NewProject {
                title: "Docks".to_string(),
                content: scene(),
                owner: Some("kim".to_string()),
            })
            .await
            .unwrap();

        let fetched = store.fetch(id).await.unwrap();
        assert_eq!(fetched.title, "Docks");
        assert_eq!(fetched.content, Some(scene()));

        store.update_title(id, "The Docks").await.unwrap();
        let stamp = Utc::now();
        store.update_content(id, json!([]), stamp).await.unwrap();

        let record = store.record(id).await.unwrap();
        assert_eq!(record.title, "The Docks");
        assert_eq!(record.content, Some(json!([])));
        assert_eq!(record.updated_at, stamp);
        assert_eq!(store.writes().await.len(), 1);

        store.delete(id).await.unwrap();
        assert!(matches!(store.fetch(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_store_failure_hooks() {
        let store = MemoryStore::new();
        let id = store.seed("Draft", None).await;

        store.set_fail_reads(true);
        assert!(matches!(store.fetch(id).await, Err(StoreError::Unavailable(_))));
        assert_eq!(store.fetch_calls(), 1);

        store.set_fail_writes(true);
        let result = store.update_content(id, scene(), Utc::now()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.writes().await.len(), 1);
        assert_eq!(store.record(id).await.unwrap().content, None);
    }

    #[tokio::test]
    async fn test_directory_store_crud() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("projects"));

        assert!(store.list().await.unwrap().is_empty());

        let id = store
            .insert(NewProject {
                title: "Pier".to_string(),
                content: scene(),
                owner: None,
            })
            .await
            .unwrap();
        assert!(dir.path().join("projects").join(format!("{}.json", id)).exists());

        store.update_title(id, "Pier 39").await.unwrap();
        store.update_content(id, json!(null), Utc::now()).await.unwrap();

        let fetched = store.fetch(id).await.unwrap();
        assert_eq!(fetched.title, "Pier 39");
        assert_eq!(fetched.content, None);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        store.delete(id).await.unwrap();
        assert!(matches!(store.fetch(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_directory_store_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let id = ProjectId::new();
        std::fs::write(dir.path().join(format!("{}.json", id)), "{ nope").unwrap();

        assert!(matches!(store.fetch(id).await, Err(StoreError::Json(_))));
        assert!(store.list().await.unwrap().is_empty());
    }
}

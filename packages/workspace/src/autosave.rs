//! # Debounced Auto-Save
//!
//! Bursts of edits collapse into one content write once the session has
//! been quiet for the debounce window.
//!
//! ```text
//! schedule(E1) ─┐
//! schedule(E2) ─┼─ timer restarted on each call
//! schedule(E3) ─┘
//!                └── quiet for `debounce` ──▶ write #n (E3) ──▶ Saving → Saved | Error
//! ```
//!
//! ## Rules
//!
//! - One pending timer per saver; a new edit aborts and restarts it
//! - A fired write runs on its own task and is never cancelled
//! - Writes may overlap and finish out of order; each carries a sequence
//!   number and only the last-issued write may publish its outcome
//! - No retries: a failed write shows up as [`SaveStatus::Error`] and the
//!   next edit tries again

use crate::store::{ProjectId, RemoteStore, StoreError};
use chrono::Utc;
use screenwright_editor::{format, Document, FormatError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Save indicator shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to serialize document: {0}")]
    Format(#[from] FormatError),

    #[error("Failed to write project: {0}")]
    Store(#[from] StoreError),

    #[error("Write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

struct Inner {
    store: Arc<dyn RemoteStore>,
    project: ProjectId,
    latest: Mutex<Option<Document>>,
    issued: AtomicU64,
    status: watch::Sender<SaveStatus>,
}

impl Inner {
    fn take_latest(&self) -> Option<Document> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Start a write on its own task and return its handle
    fn issue(self: &Arc<Self>, document: Document) -> JoinHandle<Result<(), SaveError>> {
        let mut sequence = 0;
        self.status.send_modify(|status| {
            sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            *status = SaveStatus::Saving;
        });
        tracing::debug!(project = %self.project, sequence, "issuing content write");

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.write(document).await;
            inner.complete(sequence, &result);
            result
        })
    }

    async fn write(&self, document: Document) -> Result<(), SaveError> {
        let content = format::to_value(&document)?;
        self.store
            .update_content(self.project, content, Utc::now())
            .await?;
        Ok(())
    }

    fn complete(&self, sequence: u64, result: &Result<(), SaveError>) {
        if let Err(err) = result {
            tracing::warn!(project = %self.project, sequence, error = %err, "content write failed");
        }

        let published = self.status.send_if_modified(|status| {
            if self.issued.load(Ordering::SeqCst) != sequence {
                return false;
            }
            *status = match result {
                Ok(()) => SaveStatus::Saved,
                Err(err) => SaveStatus::Error(err.to_string()),
            };
            true
        });

        if !published {
            tracing::debug!(sequence, "superseded write finished, status left alone");
        }
    }
}

/// Debounced writer for one open project
pub struct AutoSaver {
    inner: Arc<Inner>,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn RemoteStore>, project: ProjectId) -> Self {
        Self::with_debounce(store, project, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(store: Arc<dyn RemoteStore>, project: ProjectId, debounce: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                store,
                project,
                latest: Mutex::new(None),
                issued: AtomicU64::new(0),
                status,
            }),
            debounce,
            timer: Mutex::new(None),
        }
    }

    pub fn project(&self) -> ProjectId {
        self.inner.project
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn status(&self) -> SaveStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status.subscribe()
    }

    /// Writes issued so far
    pub fn issued_writes(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Whether an edit is waiting for the debounce timer
    pub fn has_pending(&self) -> bool {
        self.inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Record the latest document and restart the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, document: Document) {
        *self
            .inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(document);

        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(document) = inner.take_latest() {
                // Detached: aborting this timer later must not cancel the write
                drop(inner.issue(document));
            }
        });

        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancel the timer and write the pending document now.
    ///
    /// Returns `Ok` without writing when nothing is pending.
    pub async fn flush(&self) -> Result<(), SaveError> {
        self.cancel_timer();

        let Some(document) = self.inner.take_latest() else {
            return Ok(());
        };
        self.inner.issue(document).await?
    }

    /// Write a document immediately, bypassing the debounce
    pub async fn save_now(&self, document: Document) -> Result<(), SaveError> {
        self.cancel_timer();
        self.inner.take_latest();
        self.inner.issue(document).await?
    }

    fn cancel_timer(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.abort();
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use screenwright_editor::{Block, ElementType};

    fn script(text: &str) -> Document {
        Document::from_blocks(vec![Block::new(ElementType::Action, text)])
    }

    async fn saver_over(store: &Arc<MemoryStore>) -> (AutoSaver, ProjectId) {
        let id = store.seed("Test", None).await;
        let saver = AutoSaver::with_debounce(store.clone(), id, Duration::from_millis(1500));
        (saver, id)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_last_edit() {
        let store = Arc::new(MemoryStore::new());
        let (saver, id) = saver_over(&store).await;

        saver.schedule(script("E1"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.schedule(script("E2"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.schedule(script("E3"));

        tokio::time::sleep(Duration::from_millis(1499)).await;
        settle().await;
        assert!(store.writes().await.is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;

        let writes = store.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].content, format::to_value(&script("E3")).unwrap());
        assert_eq!(saver.status(), SaveStatus::Saved);

        let record = store.record(id).await.unwrap();
        assert_eq!(record.content, Some(format::to_value(&script("E3")).unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_starts_idle_and_shows_saving() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;
        assert_eq!(saver.status(), SaveStatus::Idle);

        store.push_write_delay(Duration::from_secs(5)).await;
        saver.schedule(script("slow"));
        tokio::time::sleep(Duration::from_millis(1600)).await;
        settle().await;
        assert_eq!(saver.status(), SaveStatus::Saving);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(saver.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_sets_error_without_retry() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;
        store.set_fail_writes(true);

        saver.schedule(script("lost"));
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;

        assert!(matches!(saver.status(), SaveStatus::Error(_)));
        assert_eq!(store.writes().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_issued_write_publishes() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;

        // First write is slow and fails; the second is fast and succeeds
        store.push_write_delay(Duration::from_secs(10)).await;
        store.push_write_delay(Duration::from_millis(0)).await;

        saver.schedule(script("first"));
        tokio::time::sleep(Duration::from_millis(1600)).await;
        settle().await;
        saver.schedule(script("second"));
        tokio::time::sleep(Duration::from_millis(1600)).await;
        settle().await;

        assert_eq!(saver.issued_writes(), 2);
        assert_eq!(saver.status(), SaveStatus::Saved);

        store.set_fail_writes(true);
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;

        assert_eq!(saver.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;

        saver.schedule(script("now"));
        assert!(saver.has_pending());
        saver.flush().await.unwrap();

        assert!(!saver.has_pending());
        assert_eq!(store.writes().await.len(), 1);
        assert_eq!(saver.status(), SaveStatus::Saved);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.writes().await.len(), 1);

        saver.flush().await.unwrap();
        assert_eq!(store.writes().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_reports_write_error() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;
        store.set_fail_writes(true);

        saver.schedule(script("x"));
        assert!(matches!(saver.flush().await, Err(SaveError::Store(_))));
        assert!(matches!(saver.status(), SaveStatus::Error(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_subscription() {
        let store = Arc::new(MemoryStore::new());
        let (saver, _) = saver_over(&store).await;
        let mut status = saver.subscribe();

        saver.save_now(script("go")).await.unwrap();

        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), SaveStatus::Saved);
    }
}

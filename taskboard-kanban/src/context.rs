//! BoardContext - the explicit state handle every command works against
//!
//! The context bundles access to the backend, the shared store, the
//! user-visible error state and the activity log. It carries no business
//! logic; operations and the drag session do the work.

use crate::backend::BoardBackend;
use crate::config::EngineConfig;
use crate::error::{BoardError, ErrorKind};
use crate::reconcile::Reconciler;
use crate::store::BoardStore;
use crate::types::BoardSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use taskboard_operations::LogEntry;
use tokio::sync::{watch, RwLock};

/// Store handle shared by the session, the reconciler and operations
pub type SharedStore = Arc<RwLock<BoardStore>>;

/// A user-visible error message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl From<&BoardError> for ErrorNotice {
    fn from(error: &BoardError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            at: Utc::now(),
        }
    }
}

/// Latest error, observable by any number of subscribers
#[derive(Debug, Clone)]
pub struct ErrorState {
    tx: Arc<watch::Sender<Option<ErrorNotice>>>,
}

impl ErrorState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Publish `error` as the current notice
    pub fn record(&self, error: &BoardError) {
        self.tx.send_replace(Some(ErrorNotice::from(error)));
    }

    /// The current notice, if any
    pub fn current(&self) -> Option<ErrorNotice> {
        self.tx.borrow().clone()
    }

    /// Dismiss the current notice
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ErrorNotice>> {
        self.tx.subscribe()
    }
}

impl Default for ErrorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded in-memory activity log, newest first
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<RwLock<VecDeque<LogEntry>>>,
    limit: usize,
}

impl ActivityLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            limit: limit.max(1),
        }
    }

    pub async fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(self.limit);
    }

    /// Entries newest first, at most `limit` of them
    pub async fn recent(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let entries = self.entries.read().await;
        let take = limit.unwrap_or(entries.len());
        entries.iter().take(take).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Context passed to every command - provides access, not logic
pub struct BoardContext<B> {
    backend: Arc<B>,
    store: SharedStore,
    errors: ErrorState,
    activity: ActivityLog,
    config: Arc<EngineConfig>,
}

impl<B> Clone for BoardContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            errors: self.errors.clone(),
            activity: self.activity.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: BoardBackend> BoardContext<B> {
    /// Create a context owning `backend`, with an empty store
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self::with_backend(Arc::new(backend), config)
    }

    /// Create a context around a backend that is shared elsewhere
    pub fn with_backend(backend: Arc<B>, config: EngineConfig) -> Self {
        let activity = ActivityLog::new(config.activity_limit);
        Self {
            backend,
            store: Arc::new(RwLock::new(BoardStore::new())),
            errors: ErrorState::new(),
            activity,
            config: Arc::new(config),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current snapshot of the board tree
    pub async fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.store.read().await.snapshot()
    }

    /// Reconciler bound to this context's backend, store and error state
    pub fn reconciler(&self) -> Reconciler<B> {
        Reconciler::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.store),
            self.errors.clone(),
            self.config.on_move_failure,
        )
    }
}

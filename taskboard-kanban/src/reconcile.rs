//! Persistence Reconciler
//!
//! Turns a completed drop into exactly one `move_task` write and reconciles
//! the optimistic tree with its outcome. Write failures never propagate to
//! the gesture source as faults: they are recorded on the [`ErrorState`]
//! and, under [`MoveFailurePolicy::Restore`], the task goes back to where
//! the drag started. A failed write whose task has been claimed again by a
//! newer move or gesture, or has moved since, leaves the tree alone.

use crate::backend::BoardBackend;
use crate::config::MoveFailurePolicy;
use crate::context::{ErrorState, SharedStore};
use crate::drag::{DragOrigin, DropCommit};
use crate::error::{BoardError, Result};
use crate::store::BoardStore;
use crate::types::{BoardSnapshot, TaskId};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct Reconciler<B> {
    backend: Arc<B>,
    store: SharedStore,
    errors: ErrorState,
    policy: MoveFailurePolicy,
}

impl<B> Clone for Reconciler<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            errors: self.errors.clone(),
            policy: self.policy,
        }
    }
}

impl<B: BoardBackend> Reconciler<B> {
    pub fn new(
        backend: Arc<B>,
        store: SharedStore,
        errors: ErrorState,
        policy: MoveFailurePolicy,
    ) -> Self {
        Self {
            backend,
            store,
            errors,
            policy,
        }
    }

    pub fn policy(&self) -> MoveFailurePolicy {
        self.policy
    }

    /// Write a drop to the backend.
    ///
    /// On success the optimistic tree already shows the move and is left
    /// alone. On failure the error is recorded, the tree is restored when
    /// the policy says so, and the classified error is returned.
    pub async fn commit_move(&self, commit: &DropCommit) -> Result<()> {
        let written = self
            .backend
            .move_task(&commit.task_id, &commit.column_id, commit.index)
            .await;

        match written {
            Ok(()) => {
                info!(
                    task_id = %commit.task_id,
                    column_id = %commit.column_id,
                    index = commit.index,
                    "committed move"
                );
                Ok(())
            }
            Err(source) => {
                let err = BoardError::write_failed("move task", source);
                error!(task_id = %commit.task_id, error = %err, "move was not persisted");
                self.errors.record(&err);
                if self.policy == MoveFailurePolicy::Restore {
                    self.roll_back(commit).await;
                }
                Err(err)
            }
        }
    }

    /// Undo a failed drop, unless the task has been claimed or moved since
    async fn roll_back(&self, commit: &DropCommit) -> bool {
        let mut store = self.store.write().await;
        if !store.is_latest_claim(&commit.task_id, commit.claim) {
            warn!(task_id = %commit.task_id, "failed move was superseded by a newer one, not restoring");
            return false;
        }

        let snapshot = store.current();
        let in_place = snapshot.locate_task(&commit.task_id).is_some_and(|(ci, index)| {
            snapshot.columns()[ci].id() == &commit.column_id && index == commit.index
        });
        if !in_place {
            warn!(task_id = %commit.task_id, "task moved after the failed drop, not restoring");
            return false;
        }

        self.restore_locked(&mut store, &commit.task_id, &commit.origin)
    }

    /// Put `task_id` back at `origin`. Returns false, with the reason
    /// recorded, when the task can no longer be placed there.
    pub async fn restore(&self, task_id: &TaskId, origin: &DragOrigin) -> bool {
        let mut store = self.store.write().await;
        self.restore_locked(&mut store, task_id, origin)
    }

    fn restore_locked(&self, store: &mut BoardStore, task_id: &TaskId, origin: &DragOrigin) -> bool {
        match restore_origin(store, task_id, origin) {
            Ok(_) => {
                info!(task_id = %task_id, column_id = %origin.column_id, index = origin.index, "restored task to drag origin");
                true
            }
            Err(err) => {
                warn!(task_id = %task_id, error = %err, "could not restore task");
                self.errors.record(&err);
                false
            }
        }
    }
}

/// Move `task_id`, wherever it is now, to `origin` (index clamped)
pub(crate) fn restore_origin(
    store: &mut BoardStore,
    task_id: &TaskId,
    origin: &DragOrigin,
) -> Result<Arc<BoardSnapshot>> {
    let current = store
        .current()
        .column_of(task_id)
        .cloned()
        .ok_or_else(|| BoardError::TaskNotFound {
            id: task_id.to_string(),
        })?;
    store.move_task_across_columns(task_id, &current, &origin.column_id, origin.index)
}

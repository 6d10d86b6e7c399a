//! Gesture event loop for one board view.
//!
//! A [`BoardSession`] owns the [`DragController`] and feeds it gesture
//! events, locking the shared store once per event. Releases hand the drop
//! to the [`Reconciler`](crate::reconcile::Reconciler) on a spawned task so
//! the gesture is back to idle before the write resolves. Writes of one
//! session reach the backend one at a time, in release order.

use crate::backend::BoardBackend;
use crate::config::MoveFailurePolicy;
use crate::context::BoardContext;
use crate::drag::{DragController, DragOrigin, DragStep, DropCommit, Release};
use crate::error::{BoardError, Result};
use crate::types::TaskId;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Input from a pointer or touch gesture source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    Start {
        active: String,
    },
    Over {
        active: String,
        #[serde(default)]
        over: Option<String>,
    },
    End {
        active: String,
        #[serde(default)]
        over: Option<String>,
    },
    Cancel {
        active: String,
    },
}

/// A move write that is still in flight
#[derive(Debug)]
pub struct PendingCommit {
    commit: DropCommit,
    handle: JoinHandle<Result<()>>,
}

impl PendingCommit {
    pub fn commit(&self) -> &DropCommit {
        &self.commit
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the write. Its error, if any, has already been recorded on
    /// the session's error state.
    pub async fn wait(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(join) => Err(BoardError::write_failed(
                "move task",
                BoardError::backend(join.to_string()),
            )),
        }
    }
}

/// One board view: the shared context plus the active gesture
pub struct BoardSession<B> {
    ctx: BoardContext<B>,
    drag: DragController,
    /// Resolves once the most recently released write has finished
    last_commit: Option<oneshot::Receiver<()>>,
}

impl<B: BoardBackend> BoardSession<B> {
    pub fn new(ctx: BoardContext<B>) -> Self {
        let drag = DragController::new(ctx.config().column_drop_prefix.clone());
        Self {
            ctx,
            drag,
            last_commit: None,
        }
    }

    pub fn context(&self) -> &BoardContext<B> {
        &self.ctx
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Observe the task being dragged
    pub fn subscribe_active(&self) -> watch::Receiver<Option<TaskId>> {
        self.drag.subscribe_active()
    }

    /// Gesture start. The task is claimed, so a write of an earlier drop
    /// that fails meanwhile no longer moves it.
    pub async fn on_drag_start(&mut self, active: &str) -> DragStep {
        let mut store = self.ctx.store().write().await;
        let step = self.drag.start(&store, active);
        if let DragStep::Started { task_id, .. } = &step {
            store.claim_task(task_id);
        }
        step
    }

    /// Hover change. Consistency errors are recorded, never returned.
    pub async fn on_drag_over(&mut self, active: &str, over: Option<&str>) -> DragStep {
        let mut store = self.ctx.store().write().await;
        match self.drag.hover(&mut store, active, over) {
            Ok(step) => step,
            Err(err) => {
                warn!(active, over, error = %err, "hover could not be applied");
                self.ctx.errors().record(&err);
                DragStep::Ignored
            }
        }
    }

    /// Release. Returns the in-flight write when the drop resolved.
    pub async fn on_drag_end(&mut self, active: &str, over: Option<&str>) -> Option<PendingCommit> {
        let release = {
            let mut store = self.ctx.store().write().await;
            self.drag.release(&mut store, active, over)
        };

        match release {
            Ok(Release::Drop(commit)) => Some(self.spawn_commit(commit)),
            Ok(Release::Aborted { task_id, origin }) => {
                self.settle_abandoned(&task_id, &origin).await;
                None
            }
            Ok(Release::Ignored) => None,
            Err(err) => {
                warn!(active, over, error = %err, "drop could not be resolved");
                self.ctx.errors().record(&err);
                None
            }
        }
    }

    pub async fn on_drag_cancel(&mut self, active: &str) {
        if let Some((task_id, origin)) = self.drag.cancel(active) {
            self.settle_abandoned(&task_id, &origin).await;
        }
    }

    /// Dispatch one gesture event
    pub async fn handle(&mut self, event: GestureEvent) -> Option<PendingCommit> {
        match event {
            GestureEvent::Start { active } => {
                self.on_drag_start(&active).await;
                None
            }
            GestureEvent::Over { active, over } => {
                self.on_drag_over(&active, over.as_deref()).await;
                None
            }
            GestureEvent::End { active, over } => self.on_drag_end(&active, over.as_deref()).await,
            GestureEvent::Cancel { active } => {
                self.on_drag_cancel(&active).await;
                None
            }
        }
    }

    /// Consume events until the channel closes or `token` is cancelled.
    ///
    /// A drag still active when the loop stops is cancelled. Returns the
    /// writes started by the loop; they keep running if not awaited.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<GestureEvent>,
        token: CancellationToken,
    ) -> Vec<PendingCommit> {
        let mut pending = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("gesture loop cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(commit) = self.handle(event).await {
                            pending.push(commit);
                        }
                    }
                    None => break,
                },
            }
        }

        if let Some(active) = self.drag.active_task() {
            self.on_drag_cancel(active.as_str()).await;
        }
        pending
    }

    fn spawn_commit(&mut self, commit: DropCommit) -> PendingCommit {
        let reconciler = self.ctx.reconciler();
        let previous = self.last_commit.take();
        let (done, finished) = oneshot::channel();
        self.last_commit = Some(finished);

        let job = commit.clone();
        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                // Err only means the previous write task is gone
                let _ = previous.await;
            }
            let result = reconciler.commit_move(&job).await;
            let _ = done.send(());
            result
        });
        PendingCommit { commit, handle }
    }

    async fn settle_abandoned(&self, task_id: &TaskId, origin: &DragOrigin) {
        if self.ctx.config().on_move_failure == MoveFailurePolicy::Restore {
            self.ctx.reconciler().restore(task_id, origin).await;
        }
    }
}

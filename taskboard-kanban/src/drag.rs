//! Drag Session Controller
//!
//! A small synchronous state machine, `Idle -> Dragging -> Idle`, fed with
//! the raw ids a gesture source reports. Every hover recomputes indices
//! from the current store, so coalesced or dropped events never leave the
//! tree in a state that depends on event history.

use crate::error::{BoardError, Result};
use crate::store::BoardStore;
use crate::types::{BoardSnapshot, ColumnId, HoverTarget, TaskId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Where a dragged task sat when the gesture started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragOrigin {
    pub column_id: ColumnId,
    pub index: usize,
}

/// A completed drop, ready to be written to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropCommit {
    pub task_id: TaskId,
    pub column_id: ColumnId,
    pub index: usize,
    pub origin: DragOrigin,
    /// Store claim taken when the drop was made
    #[serde(skip)]
    pub claim: u64,
}

impl DropCommit {
    /// True when the task ends exactly where it started
    pub fn is_noop(&self) -> bool {
        self.origin.column_id == self.column_id && self.origin.index == self.index
    }
}

/// Outcome of a start or hover event
#[derive(Debug, Clone, PartialEq)]
pub enum DragStep {
    /// The event did not apply (no drag, wrong task, unresolved target)
    Ignored,
    /// A drag began
    Started { task_id: TaskId, origin: DragOrigin },
    /// The event resolved but the tree already matches it
    Unchanged,
    /// The tree was reordered optimistically
    Moved(Arc<BoardSnapshot>),
}

/// Outcome of a release
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// No drag was in progress
    Ignored,
    /// Released over nothing usable; no write happens
    Aborted { task_id: TaskId, origin: DragOrigin },
    Drop(DropCommit),
}

#[derive(Debug, Clone)]
enum DragState {
    Idle,
    Dragging {
        task_id: TaskId,
        origin: DragOrigin,
        /// Hover id most recently applied to the store
        last_over: Option<String>,
    },
}

/// Tracks the single active gesture of a board view
#[derive(Debug)]
pub struct DragController {
    state: DragState,
    active: watch::Sender<Option<TaskId>>,
    column_prefix: String,
}

impl DragController {
    /// Create an idle controller. `column_prefix` tags hover ids that name
    /// a column drop zone (`"column-"` by default).
    pub fn new(column_prefix: impl Into<String>) -> Self {
        let (active, _rx) = watch::channel(None);
        Self {
            state: DragState::Idle,
            active,
            column_prefix: column_prefix.into(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The task currently being dragged
    pub fn active_task(&self) -> Option<TaskId> {
        self.active.borrow().clone()
    }

    /// Observe the dragged task, e.g. to render a drag overlay
    pub fn subscribe_active(&self) -> watch::Receiver<Option<TaskId>> {
        self.active.subscribe()
    }

    /// Origin of the drag in progress
    pub fn origin(&self) -> Option<&DragOrigin> {
        match &self.state {
            DragState::Dragging { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }

    /// Gesture start on the task with id `active`
    pub fn start(&mut self, store: &BoardStore, active: &str) -> DragStep {
        if let DragState::Dragging { task_id, .. } = &self.state {
            debug!(active, dragging = %task_id, "ignoring drag start while a drag is active");
            return DragStep::Ignored;
        }

        let snapshot = store.current();
        let Some(task) = snapshot.find_task_by_raw(active) else {
            debug!(active, "drag start on unknown task");
            return DragStep::Ignored;
        };
        let Some((ci, index)) = snapshot.locate_task(&task.id) else {
            return DragStep::Ignored;
        };

        let task_id = task.id.clone();
        let origin = DragOrigin {
            column_id: snapshot.columns[ci].id().clone(),
            index,
        };
        debug!(task_id = %task_id, column_id = %origin.column_id, index, "drag started");

        self.state = DragState::Dragging {
            task_id: task_id.clone(),
            origin: origin.clone(),
            last_over: None,
        };
        self.active.send_replace(Some(task_id.clone()));
        DragStep::Started { task_id, origin }
    }

    /// The element under the pointer changed to `over`
    pub fn hover(
        &mut self,
        store: &mut BoardStore,
        active: &str,
        over: Option<&str>,
    ) -> Result<DragStep> {
        let (task_id, last_over) = match &self.state {
            DragState::Dragging {
                task_id, last_over, ..
            } if task_id.as_str() == active => (task_id.clone(), last_over.as_deref()),
            _ => return Ok(DragStep::Ignored),
        };
        let Some(over) = over else {
            return Ok(DragStep::Ignored);
        };
        // Only a change of the element under the pointer moves anything.
        if last_over == Some(over) {
            return Ok(DragStep::Unchanged);
        }

        let step = self.apply_hover(store, &task_id, over)?;
        if let DragState::Dragging { last_over, .. } = &mut self.state {
            *last_over = Some(over.to_string());
        }
        Ok(step)
    }

    /// Gesture released over `over`.
    ///
    /// The controller is back to `Idle` and the active task is cleared
    /// whatever the outcome, errors included.
    pub fn release(
        &mut self,
        store: &mut BoardStore,
        active: &str,
        over: Option<&str>,
    ) -> Result<Release> {
        let (task_id, origin, last_over) = match &self.state {
            DragState::Dragging {
                task_id,
                origin,
                last_over,
            } if task_id.as_str() == active => {
                (task_id.clone(), origin.clone(), last_over.clone())
            }
            _ => return Ok(Release::Ignored),
        };
        self.finish();

        let target = over.and_then(|over| {
            store
                .current()
                .resolve_hover(over, &self.column_prefix)
                .map(|target| (over, target))
        });
        let Some((over, target)) = target else {
            warn!(task_id = %task_id, over, "drop target did not resolve, aborting drag");
            return Ok(Release::Aborted { task_id, origin });
        };

        // Hover events may have been coalesced away; catch up first.
        if last_over.as_deref() != Some(over) {
            self.apply_hover(store, &task_id, over)?;
        }

        let snapshot = store.current();
        let (ci, index) = snapshot
            .locate_task(&task_id)
            .ok_or_else(|| BoardError::TaskNotFound {
                id: task_id.to_string(),
            })?;
        let column_id = snapshot.columns[ci].id().clone();
        if &column_id != target.column_id() {
            return Err(BoardError::TaskNotInColumn {
                task_id: task_id.to_string(),
                column_id: target.column_id().to_string(),
            });
        }

        debug!(task_id = %task_id, column_id = %column_id, index, "drag released");
        let claim = store.claim_task(&task_id);
        Ok(Release::Drop(DropCommit {
            task_id,
            column_id,
            index,
            origin,
            claim,
        }))
    }

    /// Gesture cancelled by the source (e.g. escape)
    pub fn cancel(&mut self, active: &str) -> Option<(TaskId, DragOrigin)> {
        let cancelled = match &self.state {
            DragState::Dragging {
                task_id, origin, ..
            } if task_id.as_str() == active => Some((task_id.clone(), origin.clone())),
            _ => None,
        }?;
        debug!(task_id = %cancelled.0, "drag cancelled");
        self.finish();
        Some(cancelled)
    }

    fn finish(&mut self) {
        self.state = DragState::Idle;
        self.active.send_replace(None);
    }

    fn apply_hover(&self, store: &mut BoardStore, task_id: &TaskId, over: &str) -> Result<DragStep> {
        let snapshot = store.current();
        let Some(target) = snapshot.resolve_hover(over, &self.column_prefix) else {
            return Ok(DragStep::Ignored);
        };
        let Some((ci, from)) = snapshot.locate_task(task_id) else {
            warn!(task_id = %task_id, "dragged task is no longer on the board");
            return Ok(DragStep::Ignored);
        };
        let source = snapshot.columns[ci].id().clone();

        if target.column_id() == &source {
            let HoverTarget::Task { index, .. } = target else {
                return Ok(DragStep::Unchanged);
            };
            if index == from {
                return Ok(DragStep::Unchanged);
            }
            let next = store.reorder_task_within_column(&source, from, index)?;
            return Ok(DragStep::Moved(next));
        }

        let dest = target.column_id().clone();
        let end = snapshot.column(&dest).map_or(0, |c| c.tasks.len());
        let next = store.move_task_across_columns(task_id, &source, &dest, end)?;
        Ok(DragStep::Moved(next))
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(crate::defaults::COLUMN_DROP_PREFIX)
    }
}

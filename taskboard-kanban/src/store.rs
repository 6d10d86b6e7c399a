//! Board State Store
//!
//! Holds the current [`BoardSnapshot`] and derives a new snapshot for every
//! mutation. A mutation that changes nothing hands back the very same
//! `Arc`, so callers can skip redundant renders and writes with
//! [`Arc::ptr_eq`].

use crate::error::{BoardError, Result};
use crate::ordering::{move_within_list, transfer_between_lists};
use crate::types::{
    Board, BoardSnapshot, Column, ColumnId, ColumnPatch, ColumnWithTasks, Task, TaskId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owner of the in-memory board tree
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    current: Arc<BoardSnapshot>,
    /// Latest claim per task; a move or gesture holding an older one is stale
    claims: HashMap<TaskId, u64>,
    last_claim: u64,
}

impl BoardStore {
    /// Create an empty store (no board loaded)
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        Arc::clone(&self.current)
    }

    /// Borrow the current snapshot without bumping the refcount
    pub fn current(&self) -> &BoardSnapshot {
        &self.current
    }

    pub fn is_loaded(&self) -> bool {
        self.current.board.is_some()
    }

    /// Replace the whole tree. Columns and tasks are kept in the given
    /// order and renumbered so `sort_order` matches position.
    pub fn replace_all(&mut self, board: Board, columns: Vec<ColumnWithTasks>) -> Arc<BoardSnapshot> {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, mut column)| {
                column.column.sort_order = index;
                column.renumber();
                Arc::new(column)
            })
            .collect();

        self.publish(BoardSnapshot {
            board: Some(board),
            columns,
        })
    }

    /// Drop everything (e.g. after a failed load)
    pub fn clear(&mut self) -> Arc<BoardSnapshot> {
        self.publish(BoardSnapshot::default())
    }

    /// Move a task to another index of the same column
    pub fn reorder_task_within_column(
        &mut self,
        column_id: &ColumnId,
        from: usize,
        to: usize,
    ) -> Result<Arc<BoardSnapshot>> {
        let ci = self.column_index(column_id)?;
        let column = &self.current.columns[ci];
        let len = column.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::IndexOutOfRange {
                    column_id: column_id.to_string(),
                    index,
                    len,
                });
            }
        }
        if from == to {
            return Ok(self.snapshot());
        }

        let mut updated = ColumnWithTasks {
            column: column.column.clone(),
            tasks: move_within_list(&column.tasks, from, to),
        };
        updated.renumber();
        debug!(column_id = %column_id, from, to, "reordered task within column");

        let mut next = (*self.current).clone();
        next.columns[ci] = Arc::new(updated);
        Ok(self.publish(next))
    }

    /// Move `task_id` from `source` to `dest` at `dest_index` (clamped).
    ///
    /// Fails with [`BoardError::TaskNotInColumn`] when the task is not where
    /// the caller claims it is.
    pub fn move_task_across_columns(
        &mut self,
        task_id: &TaskId,
        source: &ColumnId,
        dest: &ColumnId,
        dest_index: usize,
    ) -> Result<Arc<BoardSnapshot>> {
        let si = self.column_index(source)?;
        let di = self.column_index(dest)?;
        let from = self.current.columns[si]
            .position_of(task_id)
            .ok_or_else(|| BoardError::TaskNotInColumn {
                task_id: task_id.to_string(),
                column_id: source.to_string(),
            })?;

        if si == di {
            let last = self.current.columns[si].tasks.len() - 1;
            return self.reorder_task_within_column(source, from, dest_index.min(last));
        }

        let src = &self.current.columns[si];
        let dst = &self.current.columns[di];
        let (src_tasks, dst_tasks) = transfer_between_lists(&src.tasks, &dst.tasks, from, dest_index);

        let mut new_src = ColumnWithTasks {
            column: src.column.clone(),
            tasks: src_tasks,
        };
        let mut new_dst = ColumnWithTasks {
            column: dst.column.clone(),
            tasks: dst_tasks,
        };
        new_src.renumber();
        new_dst.renumber();
        debug!(
            task_id = %task_id,
            source = %source,
            dest = %dest,
            index = dest_index.min(dst.tasks.len()),
            "moved task across columns"
        );

        let mut next = (*self.current).clone();
        next.columns[si] = Arc::new(new_src);
        next.columns[di] = Arc::new(new_dst);
        Ok(self.publish(next))
    }

    /// Update fields of a column
    pub fn patch_column(&mut self, column_id: &ColumnId, patch: &ColumnPatch) -> Result<Arc<BoardSnapshot>> {
        let ci = self.column_index(column_id)?;
        let mut column = (*self.current.columns[ci]).clone();
        if !patch.apply(&mut column.column) {
            return Ok(self.snapshot());
        }

        let mut next = (*self.current).clone();
        next.columns[ci] = Arc::new(column);
        Ok(self.publish(next))
    }

    /// Append a server-confirmed column at the end of the board
    pub fn append_column(&mut self, column: Column) -> Result<Arc<BoardSnapshot>> {
        if self.current.column_index(&column.id).is_some() {
            return Err(BoardError::duplicate_id("column", column.id.to_string()));
        }

        let mut column = ColumnWithTasks::new(column);
        column.column.sort_order = self.current.columns.len();

        let mut next = (*self.current).clone();
        next.columns.push(Arc::new(column));
        Ok(self.publish(next))
    }

    /// Append a server-confirmed task to the end of a column
    pub fn append_task_to_column(&mut self, column_id: &ColumnId, task: Task) -> Result<Arc<BoardSnapshot>> {
        let ci = self.column_index(column_id)?;
        if self.current.locate_task(&task.id).is_some() {
            return Err(BoardError::duplicate_id("task", task.id.to_string()));
        }

        let mut column = (*self.current.columns[ci]).clone();
        column.tasks.push(task);
        column.renumber();

        let mut next = (*self.current).clone();
        next.columns[ci] = Arc::new(column);
        Ok(self.publish(next))
    }

    /// Replace the board metadata with a server-confirmed version
    pub fn patch_board(&mut self, board: Board) -> Result<Arc<BoardSnapshot>> {
        let Some(current) = &self.current.board else {
            return Err(BoardError::BoardNotLoaded);
        };
        if current.id != board.id {
            return Err(BoardError::BoardNotFound {
                id: board.id.to_string(),
            });
        }
        if *current == board {
            return Ok(self.snapshot());
        }

        let mut next = (*self.current).clone();
        next.board = Some(board);
        Ok(self.publish(next))
    }

    /// Register a new move or gesture of `task_id`. Any earlier claim on the
    /// task stops being the latest.
    pub fn claim_task(&mut self, task_id: &TaskId) -> u64 {
        self.last_claim += 1;
        self.claims.insert(task_id.clone(), self.last_claim);
        self.last_claim
    }

    /// True when `claim` is the most recent claim on `task_id`
    pub fn is_latest_claim(&self, task_id: &TaskId, claim: u64) -> bool {
        self.claims.get(task_id) == Some(&claim)
    }

    fn column_index(&self, column_id: &ColumnId) -> Result<usize> {
        self.current
            .column_index(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound {
                id: column_id.to_string(),
            })
    }

    fn publish(&mut self, next: BoardSnapshot) -> Arc<BoardSnapshot> {
        self.current = Arc::new(next);
        self.snapshot()
    }
}

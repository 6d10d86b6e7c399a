//! Collaborator interface to the authoritative store.
//!
//! The engine never talks to storage directly: every load and write goes
//! through a [`BoardBackend`]. Two implementations ship with the crate:
//! [`InMemoryBackend`] (integer-keyed rows, like a SQL table) and
//! [`FileBackend`] (one YAML file per entity under a data directory).

mod file;
mod memory;

pub use file::{FileBackend, FileLock};
pub use memory::InMemoryBackend;

use crate::error::{BoardError, Result};
use crate::types::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnWithTasks, NewBoard, NewTask, Task,
    TaskId, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use taskboard_operations::LogEntry;

/// A board with its columns, each carrying its tasks
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBoard {
    pub board: Board,
    pub columns: Vec<ColumnWithTasks>,
}

impl LoadedBoard {
    /// Order columns and the tasks inside each column by `sort_order`.
    ///
    /// The sort is stable: rows sharing a `sort_order` keep the order the
    /// backend returned them in.
    pub fn sorted(mut self) -> Self {
        self.columns.sort_by_key(|c| c.column.sort_order);
        for column in &mut self.columns {
            column.tasks.sort_by_key(|t| t.sort_order);
        }
        self
    }
}

/// The authoritative store behind a board view
#[async_trait]
pub trait BoardBackend: Send + Sync + 'static {
    /// Fetch a board with all of its columns and tasks
    async fn load_board_with_columns_and_tasks(&self, board_id: &BoardId) -> Result<LoadedBoard>;

    /// Boards owned by `owner`, newest first
    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>>;

    async fn create_board(&self, board: NewBoard) -> Result<Board>;

    async fn update_board(&self, board_id: &BoardId, patch: &BoardPatch) -> Result<Board>;

    /// Create a column at the end of the board (`sort_order` = column count)
    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column>;

    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<Column>;

    /// Create a task at the end of a column (`sort_order` = task count)
    async fn create_task(&self, column_id: &ColumnId, task: NewTask) -> Result<Task>;

    /// Put a task into `column_id` at position `order`
    async fn move_task(&self, task_id: &TaskId, column_id: &ColumnId, order: usize) -> Result<()>;

    /// Persist an audit entry. Backends without an audit trail ignore it.
    async fn record_activity(&self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }
}

/// Place `task_id` into `column_id` at `order` (clamped) and renumber the
/// source and destination columns densely.
///
/// `tasks` must hold at least every row of both columns; rows of other
/// columns are ignored. Returns only the rows whose column or
/// `sort_order` changed.
pub(crate) fn reposition(
    tasks: Vec<Task>,
    task_id: &TaskId,
    column_id: &ColumnId,
    order: usize,
) -> Result<Vec<Task>> {
    let before: HashMap<TaskId, (ColumnId, usize)> = tasks
        .iter()
        .map(|t| (t.id.clone(), (t.column_id.clone(), t.sort_order)))
        .collect();

    let (mut moving, others): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(|t| &t.id == task_id);
    let mut moving = moving.pop().ok_or_else(|| BoardError::TaskNotFound {
        id: task_id.to_string(),
    })?;
    let source = moving.column_id.clone();

    let column_rows = |column: &ColumnId| {
        let mut rows: Vec<Task> = others
            .iter()
            .filter(|t| &t.column_id == column)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.sort_order);
        rows
    };

    let mut dest = column_rows(column_id);
    moving.column_id = column_id.clone();
    let at = order.min(dest.len());
    dest.insert(at, moving);

    let mut groups = vec![dest];
    if &source != column_id {
        groups.push(column_rows(&source));
    }

    let mut changed = Vec::new();
    for group in groups {
        for (index, mut task) in group.into_iter().enumerate() {
            task.sort_order = index;
            let moved = before
                .get(&task.id)
                .map_or(true, |(column, order)| column != &task.column_id || *order != index);
            if moved {
                changed.push(task);
            }
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::BoardFixture;

    #[test]
    fn test_sorted_orders_columns_and_tasks() {
        let (board, mut columns) = BoardFixture::new()
            .column("a", &["a1"])
            .column("b", &[])
            .column("c", &["c1", "c2"])
            .build();
        // Columns persisted as [0, 2, 1], tasks of "c" as [1, 0]
        columns[1].column.sort_order = 2;
        columns[2].column.sort_order = 1;
        columns[2].tasks[0].sort_order = 1;
        columns[2].tasks[1].sort_order = 0;

        let loaded = LoadedBoard { board, columns }.sorted();
        let ids: Vec<_> = loaded.columns.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
        let tasks: Vec<_> = loaded.columns[1].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tasks, ["c2", "c1"]);
    }

    #[test]
    fn test_sorted_is_stable_on_ties() {
        let (board, mut columns) = BoardFixture::new().column("a", &["x", "y", "z"]).build();
        for task in &mut columns[0].tasks {
            task.sort_order = 0;
        }
        let loaded = LoadedBoard { board, columns }.sorted();
        let tasks: Vec<_> = loaded.columns[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tasks, ["x", "y", "z"]);
    }

    fn all_tasks(columns: &[ColumnWithTasks]) -> Vec<Task> {
        columns.iter().flat_map(|c| c.tasks.clone()).collect()
    }

    #[test]
    fn test_reposition_across_columns_renumbers_both() {
        let (_, columns) = BoardFixture::new()
            .column("todo", &["t1", "t2", "t3"])
            .column("done", &["d1"])
            .column("other", &["o1"])
            .build();

        let changed = reposition(
            all_tasks(&columns),
            &TaskId::from_string("t1"),
            &ColumnId::from_string("done"),
            0,
        )
        .unwrap();

        let mut placed: Vec<_> = changed
            .iter()
            .map(|t| (t.id.to_string(), t.column_id.to_string(), t.sort_order))
            .collect();
        placed.sort();
        assert_eq!(
            placed,
            [
                ("d1".to_string(), "done".to_string(), 1),
                ("t1".to_string(), "done".to_string(), 0),
                ("t2".to_string(), "todo".to_string(), 0),
                ("t3".to_string(), "todo".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_reposition_within_column_clamps() {
        let (_, columns) = BoardFixture::new().column("todo", &["t1", "t2"]).build();
        let changed = reposition(
            all_tasks(&columns),
            &TaskId::from_string("t1"),
            &ColumnId::from_string("todo"),
            99,
        )
        .unwrap();
        let t1 = changed.iter().find(|t| t.id.as_str() == "t1").unwrap();
        assert_eq!(t1.sort_order, 1);
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn test_reposition_unknown_task() {
        let result = reposition(
            Vec::new(),
            &TaskId::from_string("nope"),
            &ColumnId::from_string("todo"),
            0,
        );
        assert!(matches!(result, Err(BoardError::TaskNotFound { .. })));
    }
}

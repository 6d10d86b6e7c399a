//! Immutable snapshots of the board tree

use super::board::{Board, Column};
use super::ids::{ColumnId, TaskId};
use super::task::Task;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A column together with its ordered tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl ColumnWithTasks {
    pub fn new(column: Column) -> Self {
        Self {
            column,
            tasks: Vec::new(),
        }
    }

    pub fn id(&self) -> &ColumnId {
        &self.column.id
    }

    /// Index of `task_id` in this column
    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task_id)
    }

    /// Set every task's `sort_order` to its index and its `column_id` to
    /// this column.
    pub(crate) fn renumber(&mut self) {
        let column_id = self.column.id.clone();
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.sort_order = index;
            if task.column_id != column_id {
                task.column_id = column_id.clone();
            }
        }
    }
}

/// Where a hover id points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverTarget {
    /// Over a task card: its column and its current index
    Task {
        task_id: TaskId,
        column_id: ColumnId,
        index: usize,
    },
    /// Directly over a column's drop zone
    Column { column_id: ColumnId },
}

impl HoverTarget {
    pub fn column_id(&self) -> &ColumnId {
        match self {
            Self::Task { column_id, .. } | Self::Column { column_id } => column_id,
        }
    }
}

/// One version of `{ board, columns: [{ ...column, tasks }] }`.
///
/// Snapshots are never mutated once published; the store builds a new one
/// per change, sharing untouched columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Option<Board>,
    pub columns: Vec<Arc<ColumnWithTasks>>,
}

impl BoardSnapshot {
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn columns(&self) -> &[Arc<ColumnWithTasks>] {
        &self.columns
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&ColumnWithTasks> {
        self.columns
            .iter()
            .find(|c| c.id() == column_id)
            .map(|c| c.as_ref())
    }

    pub fn column_index(&self, column_id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == column_id)
    }

    /// `(column index, task index)` of a task
    pub fn locate_task(&self, task_id: &TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column.position_of(task_id).map(|ti| (ci, ti))
        })
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.locate_task(task_id)
            .map(|(ci, ti)| &self.columns[ci].tasks[ti])
    }

    /// Column currently holding `task_id`
    pub fn column_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.locate_task(task_id)
            .map(|(ci, _)| self.columns[ci].id())
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Find the task whose id string equals `raw`
    pub fn find_task_by_raw(&self, raw: &str) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id.as_str() == raw)
    }

    /// Resolve a hover id: first as a task id, then as a column drop zone
    /// tagged with `column_prefix`.
    pub fn resolve_hover(&self, raw: &str, column_prefix: &str) -> Option<HoverTarget> {
        for column in &self.columns {
            if let Some(index) = column.tasks.iter().position(|t| t.id.as_str() == raw) {
                return Some(HoverTarget::Task {
                    task_id: column.tasks[index].id.clone(),
                    column_id: column.id().clone(),
                    index,
                });
            }
        }

        let column_part = raw.strip_prefix(column_prefix)?;
        self.columns
            .iter()
            .find(|c| c.id().as_str() == column_part)
            .map(|c| HoverTarget::Column {
                column_id: c.id().clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardId, Priority, UserId};
    use chrono::Utc;

    fn column(id: &str, tasks: &[&str]) -> Arc<ColumnWithTasks> {
        let column_id = ColumnId::from_string(id);
        Arc::new(ColumnWithTasks {
            column: Column {
                id: column_id.clone(),
                board_id: BoardId::from_string("1"),
                title: id.to_uppercase(),
                sort_order: 0,
                owner: UserId::from_string("u"),
                created_at: Utc::now(),
            },
            tasks: tasks
                .iter()
                .enumerate()
                .map(|(i, t)| Task {
                    id: TaskId::from_string(*t),
                    column_id: column_id.clone(),
                    title: t.to_string(),
                    description: None,
                    assignee: None,
                    due_date: None,
                    priority: Priority::Medium,
                    sort_order: i,
                    created_at: Utc::now(),
                })
                .collect(),
        })
    }

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            board: None,
            columns: vec![column("todo", &["t1", "t2"]), column("doing", &[])],
        }
    }

    #[test]
    fn test_locate_task() {
        let snap = snapshot();
        assert_eq!(snap.locate_task(&TaskId::from_string("t2")), Some((0, 1)));
        assert_eq!(snap.locate_task(&TaskId::from_string("nope")), None);
        assert_eq!(snap.task_count(), 2);
    }

    #[test]
    fn test_resolve_hover_task_first() {
        let snap = snapshot();
        let target = snap.resolve_hover("t2", "column-").unwrap();
        assert_eq!(
            target,
            HoverTarget::Task {
                task_id: TaskId::from_string("t2"),
                column_id: ColumnId::from_string("todo"),
                index: 1,
            }
        );
    }

    #[test]
    fn test_resolve_hover_column_zone() {
        let snap = snapshot();
        let target = snap.resolve_hover("column-doing", "column-").unwrap();
        assert_eq!(target.column_id().as_str(), "doing");
    }

    #[test]
    fn test_resolve_hover_unknown() {
        let snap = snapshot();
        assert!(snap.resolve_hover("column-missing", "column-").is_none());
        assert!(snap.resolve_hover("doing", "column-").is_none());
    }
}

//! In-memory backend keyed by integer ids

use super::{reposition, BoardBackend, LoadedBoard};
use crate::error::{BoardError, Result};
use crate::types::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnWithTasks, NewBoard, NewTask, Task,
    TaskId, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    boards: BTreeMap<u64, Board>,
    columns: BTreeMap<u64, Column>,
    tasks: BTreeMap<u64, Task>,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn board(&self, id: &BoardId) -> Result<&Board> {
        self.boards
            .get(&key("board", id.as_str())?)
            .ok_or_else(|| BoardError::BoardNotFound { id: id.to_string() })
    }

    fn column_mut(&mut self, id: &ColumnId) -> Result<&mut Column> {
        self.columns
            .get_mut(&key("column", id.as_str())?)
            .ok_or_else(|| BoardError::ColumnNotFound { id: id.to_string() })
    }
}

/// Rows live in integer-keyed maps, the way a relational store would hold
/// them. Ids cross into the engine as decimal strings; anything that does
/// not parse is rejected with [`BoardError::InvalidId`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of task rows, across all boards
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

fn key(item_type: &str, id: &str) -> Result<u64> {
    id.parse()
        .map_err(|_| BoardError::invalid_id(item_type, id))
}

#[async_trait]
impl BoardBackend for InMemoryBackend {
    async fn load_board_with_columns_and_tasks(&self, board_id: &BoardId) -> Result<LoadedBoard> {
        let tables = self.tables.read().await;
        let board = tables.board(board_id)?.clone();

        let columns = tables
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .map(|column| ColumnWithTasks {
                column: column.clone(),
                tasks: tables
                    .tasks
                    .values()
                    .filter(|t| t.column_id == column.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(LoadedBoard { board, columns })
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>> {
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|b| &b.owner == owner)
            .cloned()
            .collect();
        // Newest first; ids are allocated in creation order
        boards.reverse();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate();
        let now = Utc::now();
        let board = Board {
            id: BoardId::from_string(id.to_string()),
            title: board.title,
            description: board.description,
            color: board.color,
            owner: board.owner,
            created_at: now,
            updated_at: now,
        };
        tables.boards.insert(id, board.clone());
        debug!(board_id = %board.id, "created board row");
        Ok(board)
    }

    async fn update_board(&self, board_id: &BoardId, patch: &BoardPatch) -> Result<Board> {
        let mut tables = self.tables.write().await;
        let board = tables
            .boards
            .get_mut(&key("board", board_id.as_str())?)
            .ok_or_else(|| BoardError::BoardNotFound {
                id: board_id.to_string(),
            })?;
        board.apply(patch);
        Ok(board.clone())
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column> {
        let mut tables = self.tables.write().await;
        let owner = tables.board(board_id)?.owner.clone();
        let sort_order = tables
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .count();

        let id = tables.allocate();
        let column = Column {
            id: ColumnId::from_string(id.to_string()),
            board_id: board_id.clone(),
            title: title.to_string(),
            sort_order,
            owner,
            created_at: Utc::now(),
        };
        tables.columns.insert(id, column.clone());
        Ok(column)
    }

    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<Column> {
        let mut tables = self.tables.write().await;
        let column = tables.column_mut(column_id)?;
        column.title = title.to_string();
        Ok(column.clone())
    }

    async fn create_task(&self, column_id: &ColumnId, task: NewTask) -> Result<Task> {
        let mut tables = self.tables.write().await;
        tables.column_mut(column_id)?;
        let sort_order = tables
            .tasks
            .values()
            .filter(|t| &t.column_id == column_id)
            .count();

        let id = tables.allocate();
        let task = Task {
            id: TaskId::from_string(id.to_string()),
            column_id: column_id.clone(),
            title: task.title,
            description: task.description,
            assignee: task.assignee,
            due_date: task.due_date,
            priority: task.priority,
            sort_order,
            created_at: Utc::now(),
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn move_task(&self, task_id: &TaskId, column_id: &ColumnId, order: usize) -> Result<()> {
        let task_key = key("task", task_id.as_str())?;
        let mut tables = self.tables.write().await;
        tables.column_mut(column_id)?;
        let Some(source) = tables.tasks.get(&task_key).map(|t| t.column_id.clone()) else {
            return Err(BoardError::TaskNotFound {
                id: task_id.to_string(),
            });
        };

        let rows: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.column_id == source || &t.column_id == column_id)
            .cloned()
            .collect();
        for task in reposition(rows, task_id, column_id, order)? {
            tables.tasks.insert(key("task", task.id.as_str())?, task);
        }
        debug!(task_id = %task_id, column_id = %column_id, order, "moved task row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    async fn seeded() -> (InMemoryBackend, Board, Column, Column) {
        let backend = InMemoryBackend::new();
        let board = backend
            .create_board(NewBoard {
                title: "Roadmap".into(),
                description: None,
                color: "bg-blue-500".into(),
                owner: UserId::from_string("u1"),
            })
            .await
            .unwrap();
        let todo = backend.create_column(&board.id, "To Do").await.unwrap();
        let done = backend.create_column(&board.id, "Done").await.unwrap();
        (backend, board, todo, done)
    }

    #[tokio::test]
    async fn test_create_assigns_sort_order_from_counts() {
        let (backend, _board, todo, done) = seeded().await;
        assert_eq!(todo.sort_order, 0);
        assert_eq!(done.sort_order, 1);

        let first = backend.create_task(&todo.id, NewTask::new("a")).await.unwrap();
        let second = backend
            .create_task(&todo.id, NewTask::new("b").with_priority(Priority::High))
            .await
            .unwrap();
        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert_eq!(second.priority, Priority::High);
        assert_eq!(todo.owner, UserId::from_string("u1"));
    }

    #[tokio::test]
    async fn test_move_task_renumbers_rows() {
        let (backend, board, todo, done) = seeded().await;
        let a = backend.create_task(&todo.id, NewTask::new("a")).await.unwrap();
        backend.create_task(&todo.id, NewTask::new("b")).await.unwrap();
        backend.create_task(&done.id, NewTask::new("c")).await.unwrap();

        backend.move_task(&a.id, &done.id, 0).await.unwrap();

        let loaded = backend
            .load_board_with_columns_and_tasks(&board.id)
            .await
            .unwrap()
            .sorted();
        let todo_titles: Vec<_> = loaded.columns[0].tasks.iter().map(|t| t.title.as_str()).collect();
        let done_titles: Vec<_> = loaded.columns[1].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(todo_titles, ["b"]);
        assert_eq!(done_titles, ["a", "c"]);
        assert_eq!(loaded.columns[0].tasks[0].sort_order, 0);
        assert_eq!(loaded.columns[1].tasks[1].sort_order, 1);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_are_rejected() {
        let (backend, _board, _todo, _done) = seeded().await;
        let err = backend
            .move_task(
                &TaskId::from_string("01HXYZ"),
                &ColumnId::from_string("1"),
                0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let backend = InMemoryBackend::new();
        let err = backend
            .load_board_with_columns_and_tasks(&BoardId::from_string("42"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::BoardNotFound { .. }));

        let err = backend
            .create_task(&ColumnId::from_string("7"), NewTask::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::ColumnNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_boards_newest_first_per_owner() {
        let backend = InMemoryBackend::new();
        for (title, owner) in [("first", "u1"), ("other", "u2"), ("second", "u1")] {
            backend
                .create_board(NewBoard {
                    title: title.into(),
                    description: None,
                    color: "bg-blue-500".into(),
                    owner: UserId::from_string(owner),
                })
                .await
                .unwrap();
        }
        let boards = backend.list_boards(&UserId::from_string("u1")).await.unwrap();
        let titles: Vec<_> = boards.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
    }
}

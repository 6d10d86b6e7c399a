//! Helpers for tests: board fixtures and a recording backend.
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for integration tests and downstream crates.

use crate::backend::{BoardBackend, InMemoryBackend, LoadedBoard};
use crate::error::{BoardError, Result};
use crate::store::BoardStore;
use crate::types::{
    Board, BoardId, BoardPatch, BoardSnapshot, Column, ColumnId, ColumnWithTasks, NewBoard,
    NewTask, Task, TaskId, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use taskboard_operations::LogEntry;

/// Builds a board tree from column and task ids
#[derive(Debug, Default)]
pub struct BoardFixture {
    columns: Vec<(String, Vec<String>)>,
}

impl BoardFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column `id` holding tasks with the given ids, in order
    pub fn column(mut self, id: &str, task_ids: &[&str]) -> Self {
        self.columns.push((
            id.to_string(),
            task_ids.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    /// Board and columns with ids taken verbatim, numbered by position
    pub fn build(self) -> (Board, Vec<ColumnWithTasks>) {
        let now = Utc::now();
        let owner = UserId::from_string("fixture");
        let board = Board {
            id: BoardId::from_string("board"),
            title: "Fixture".to_string(),
            description: None,
            color: crate::defaults::DEFAULT_BOARD_COLOR.to_string(),
            owner: owner.clone(),
            created_at: now,
            updated_at: now,
        };

        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(order, (id, tasks))| {
                let column_id = ColumnId::from_string(id.clone());
                let tasks = tasks
                    .into_iter()
                    .enumerate()
                    .map(|(index, task)| Task {
                        id: TaskId::from_string(task.clone()),
                        column_id: column_id.clone(),
                        title: task,
                        description: None,
                        assignee: None,
                        due_date: None,
                        priority: Default::default(),
                        sort_order: index,
                        created_at: now,
                    })
                    .collect();
                ColumnWithTasks {
                    column: Column {
                        id: column_id,
                        board_id: board.id.clone(),
                        title: id,
                        sort_order: order,
                        owner: owner.clone(),
                        created_at: now,
                    },
                    tasks,
                }
            })
            .collect();

        (board, columns)
    }

    /// A store holding the fixture
    pub fn store(self) -> BoardStore {
        let (board, columns) = self.build();
        let mut store = BoardStore::new();
        store.replace_all(board, columns);
        store
    }

    /// Create the fixture through `backend`. Column ids become column
    /// titles and task ids become task titles; the backend assigns ids.
    pub async fn seed<B: BoardBackend>(self, backend: &B) -> Result<LoadedBoard> {
        let board = backend
            .create_board(NewBoard {
                title: "Fixture".to_string(),
                description: None,
                color: crate::defaults::DEFAULT_BOARD_COLOR.to_string(),
                owner: UserId::from_string("fixture"),
            })
            .await?;
        for (title, tasks) in self.columns {
            let column = backend.create_column(&board.id, &title).await?;
            for task in tasks {
                backend.create_task(&column.id, NewTask::new(task)).await?;
            }
        }
        Ok(backend
            .load_board_with_columns_and_tasks(&board.id)
            .await?
            .sorted())
    }
}

/// Id of the task titled `title`
pub fn task_id(snapshot: &BoardSnapshot, title: &str) -> TaskId {
    snapshot
        .columns()
        .iter()
        .flat_map(|c| c.tasks.iter())
        .find(|t| t.title == title)
        .map(|t| t.id.clone())
        .unwrap_or_else(|| panic!("no task titled {title}"))
}

/// Id of the column titled `title`
pub fn column_id(snapshot: &BoardSnapshot, title: &str) -> ColumnId {
    snapshot
        .columns()
        .iter()
        .find(|c| c.column.title == title)
        .map(|c| c.id().clone())
        .unwrap_or_else(|| panic!("no column titled {title}"))
}

/// Task titles of the column titled `title`, in order
pub fn task_titles(snapshot: &BoardSnapshot, title: &str) -> Vec<String> {
    snapshot
        .columns()
        .iter()
        .find(|c| c.column.title == title)
        .map(|c| c.tasks.iter().map(|t| t.title.clone()).collect())
        .unwrap_or_default()
}

/// One `move_task` call as the backend saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub task_id: TaskId,
    pub column_id: ColumnId,
    pub order: usize,
}

/// Backend wrapper that records writes and can be told to fail them
#[derive(Debug, Default)]
pub struct RecordingBackend<B = InMemoryBackend> {
    inner: B,
    moves: Mutex<Vec<MoveCall>>,
    write_calls: AtomicUsize,
    fail_moves: Mutex<Option<String>>,
    slow_failure: Mutex<Option<(Duration, String)>>,
    fail_writes: Mutex<Option<String>>,
    activity: Mutex<Vec<LogEntry>>,
}

impl RecordingBackend<InMemoryBackend> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: BoardBackend> RecordingBackend<B> {
    pub fn wrap(inner: B) -> Self {
        Self {
            inner,
            moves: Mutex::default(),
            write_calls: AtomicUsize::new(0),
            fail_moves: Mutex::default(),
            slow_failure: Mutex::default(),
            fail_writes: Mutex::default(),
            activity: Mutex::default(),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Every `move_task` call so far, failed ones included
    pub fn moves(&self) -> Vec<MoveCall> {
        lock(&self.moves).clone()
    }

    /// Create/update calls that reached the backend (moves excluded)
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Audit entries passed to `record_activity`
    pub fn activity(&self) -> Vec<LogEntry> {
        lock(&self.activity).clone()
    }

    /// Make every following `move_task` fail with `message`
    pub fn fail_moves(&self, message: &str) {
        *lock(&self.fail_moves) = Some(message.to_string());
    }

    /// Make only the next `move_task` fail with `message`, after `delay`
    pub fn fail_next_move_after(&self, delay: Duration, message: &str) {
        *lock(&self.slow_failure) = Some((delay, message.to_string()));
    }

    /// Make every following create/update fail with `message`
    pub fn fail_writes(&self, message: &str) {
        *lock(&self.fail_writes) = Some(message.to_string());
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        *lock(&self.fail_moves) = None;
        *lock(&self.slow_failure) = None;
        *lock(&self.fail_writes) = None;
    }

    fn write_attempt(&self) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.fail_writes).clone() {
            Some(message) => Err(BoardError::backend(message)),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl<B: BoardBackend> BoardBackend for RecordingBackend<B> {
    async fn load_board_with_columns_and_tasks(&self, board_id: &BoardId) -> Result<LoadedBoard> {
        self.inner.load_board_with_columns_and_tasks(board_id).await
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>> {
        self.inner.list_boards(owner).await
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        self.write_attempt()?;
        self.inner.create_board(board).await
    }

    async fn update_board(&self, board_id: &BoardId, patch: &BoardPatch) -> Result<Board> {
        self.write_attempt()?;
        self.inner.update_board(board_id, patch).await
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column> {
        self.write_attempt()?;
        self.inner.create_column(board_id, title).await
    }

    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<Column> {
        self.write_attempt()?;
        self.inner.update_column_title(column_id, title).await
    }

    async fn create_task(&self, column_id: &ColumnId, task: NewTask) -> Result<Task> {
        self.write_attempt()?;
        self.inner.create_task(column_id, task).await
    }

    async fn move_task(&self, task_id: &TaskId, column_id: &ColumnId, order: usize) -> Result<()> {
        lock(&self.moves).push(MoveCall {
            task_id: task_id.clone(),
            column_id: column_id.clone(),
            order,
        });
        let slow = lock(&self.slow_failure).take();
        if let Some((delay, message)) = slow {
            tokio::time::sleep(delay).await;
            return Err(BoardError::backend(message));
        }
        let failure = lock(&self.fail_moves).clone();
        if let Some(message) = failure {
            return Err(BoardError::backend(message));
        }
        self.inner.move_task(task_id, column_id, order).await
    }

    async fn record_activity(&self, entry: &LogEntry) -> Result<()> {
        lock(&self.activity).push(entry.clone());
        self.inner.record_activity(entry).await
    }
}

//! File-backed backend
//!
//! ```text
//! data_dir/
//! ├── boards/{id}.yaml
//! ├── columns/{id}.yaml
//! ├── tasks/{id}.yaml
//! ├── activity/current.jsonl   # one LogEntry per line, appended
//! └── .lock
//! ```
//!
//! Entity files are replaced atomically (temp file + rename). Every write
//! holds an exclusive advisory lock on `.lock`. Writers sharing a
//! `FileBackend` queue up for it; another process holding it is retried a
//! few times before the write fails with [`BoardError::LockBusy`].

use super::{reposition, BoardBackend, LoadedBoard};
use crate::error::{BoardError, Result};
use crate::types::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnWithTasks, NewBoard, NewTask, Task,
    TaskId, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use taskboard_operations::LogEntry;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

const BOARDS: &str = "boards";
const COLUMNS: &str = "columns";
const TASKS: &str = "tasks";

/// Attempts at the advisory lock while another process holds it
const LOCK_ATTEMPTS: u32 = 10;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Backend storing one YAML file per board, column and task
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    /// Serializes writers of this backend and its clones
    writers: Arc<Mutex<()>>,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writers: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn activity_path(&self) -> PathBuf {
        self.root.join("activity").join("current.jsonl")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// True once at least one board has been written
    pub fn is_initialized(&self) -> bool {
        self.root.join(BOARDS).is_dir()
    }

    fn entity_path(&self, kind: &str, item_type: &str, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BoardError::invalid_id(item_type, id));
        }
        Ok(self.root.join(kind).join(format!("{id}.yaml")))
    }

    /// Take the exclusive write lock.
    ///
    /// Waits behind other writers of this backend, then retries while the
    /// lock file is held elsewhere.
    pub async fn lock(&self) -> Result<FileLock> {
        let writer = Arc::clone(&self.writers).lock_owned().await;
        let lock_path = self.lock_path();
        fs::create_dir_all(&self.root).await?;

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        let mut attempt = 1;
        loop {
            let err = match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        _writer: writer,
                    })
                }
                Err(_) => BoardError::LockBusy,
            };
            if !err.is_retryable() || attempt >= LOCK_ATTEMPTS {
                return Err(err);
            }
            debug!(attempt, path = %lock_path.display(), "write lock held elsewhere, retrying");
            tokio::time::sleep(LOCK_RETRY_DELAY).await;
            attempt += 1;
        }
    }

    async fn read_board(&self, id: &BoardId) -> Result<Board> {
        let path = self.entity_path(BOARDS, "board", id.as_str())?;
        read_entity(&path)
            .await?
            .ok_or_else(|| BoardError::BoardNotFound { id: id.to_string() })
    }

    async fn read_column(&self, id: &ColumnId) -> Result<Column> {
        let path = self.entity_path(COLUMNS, "column", id.as_str())?;
        read_entity(&path)
            .await?
            .ok_or_else(|| BoardError::ColumnNotFound { id: id.to_string() })
    }

    async fn read_task(&self, id: &TaskId) -> Result<Task> {
        let path = self.entity_path(TASKS, "task", id.as_str())?;
        read_entity(&path)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound { id: id.to_string() })
    }

    async fn write_board(&self, board: &Board) -> Result<()> {
        let path = self.entity_path(BOARDS, "board", board.id.as_str())?;
        write_entity(&path, board).await
    }

    async fn write_column(&self, column: &Column) -> Result<()> {
        let path = self.entity_path(COLUMNS, "column", column.id.as_str())?;
        write_entity(&path, column).await
    }

    async fn write_task(&self, task: &Task) -> Result<()> {
        let path = self.entity_path(TASKS, "task", task.id.as_str())?;
        write_entity(&path, task).await
    }

    async fn board_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let columns: Vec<Column> = read_all(&self.root.join(COLUMNS)).await?;
        Ok(columns
            .into_iter()
            .filter(|c| &c.board_id == board_id)
            .collect())
    }

    /// Read the activity log, newest first
    pub async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let path = self.activity_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    path = %path.display(),
                    line = number + 1,
                    error = %e,
                    "skipping unreadable activity entry"
                ),
            }
        }
        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}

/// Write lock guard - released on drop
#[derive(Debug)]
pub struct FileLock {
    file: std::fs::File,
    _writer: OwnedMutexGuard<()>,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

async fn read_entity<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).await?;
    Ok(Some(serde_yaml_ng::from_str(&content)?))
}

async fn write_entity<T: Serialize>(path: &Path, entity: &T) -> Result<()> {
    let content = serde_yaml_ng::to_string(entity)?;
    atomic_write(path, content.as_bytes()).await
}

/// Read every `*.yaml` entity in `dir`, in file name order
async fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("yaml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(item) = read_entity(&path).await? {
            items.push(item);
        }
    }
    Ok(items)
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Write several entities together: every temp file is written before any
/// of them is renamed into place, so a serialization or write error leaves
/// all targets untouched.
async fn write_entities<T: Serialize>(batch: &[(PathBuf, &T)]) -> Result<()> {
    let mut staged = Vec::with_capacity(batch.len());
    for (path, entity) in batch {
        let temp_path = path.with_extension("tmp");
        let written = async {
            let content = serde_yaml_ng::to_string(entity)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&temp_path, content).await?;
            Ok::<_, BoardError>(())
        }
        .await;
        if let Err(e) = written {
            for (temp, _) in &staged {
                let _ = fs::remove_file(temp).await;
            }
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        staged.push((temp_path, path));
    }

    for (temp_path, path) in staged {
        fs::rename(&temp_path, path).await?;
    }
    Ok(())
}

#[async_trait]
impl BoardBackend for FileBackend {
    async fn load_board_with_columns_and_tasks(&self, board_id: &BoardId) -> Result<LoadedBoard> {
        let board = self.read_board(board_id).await?;
        let columns = self.board_columns(board_id).await?;
        let tasks: Vec<Task> = read_all(&self.root.join(TASKS)).await?;

        let columns = columns
            .into_iter()
            .map(|column| {
                let tasks = tasks
                    .iter()
                    .filter(|t| t.column_id == column.id)
                    .cloned()
                    .collect();
                ColumnWithTasks { column, tasks }
            })
            .collect();

        Ok(LoadedBoard { board, columns })
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>> {
        let boards: Vec<Board> = read_all(&self.root.join(BOARDS)).await?;
        let mut boards: Vec<Board> = boards.into_iter().filter(|b| &b.owner == owner).collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let _lock = self.lock().await?;
        let now = Utc::now();
        let board = Board {
            id: BoardId::new(),
            title: board.title,
            description: board.description,
            color: board.color,
            owner: board.owner,
            created_at: now,
            updated_at: now,
        };
        self.write_board(&board).await?;
        debug!(board_id = %board.id, "wrote board file");
        Ok(board)
    }

    async fn update_board(&self, board_id: &BoardId, patch: &BoardPatch) -> Result<Board> {
        let _lock = self.lock().await?;
        let mut board = self.read_board(board_id).await?;
        board.apply(patch);
        self.write_board(&board).await?;
        Ok(board)
    }

    async fn create_column(&self, board_id: &BoardId, title: &str) -> Result<Column> {
        let _lock = self.lock().await?;
        let board = self.read_board(board_id).await?;
        let sort_order = self.board_columns(board_id).await?.len();

        let column = Column {
            id: ColumnId::new(),
            board_id: board.id,
            title: title.to_string(),
            sort_order,
            owner: board.owner,
            created_at: Utc::now(),
        };
        self.write_column(&column).await?;
        Ok(column)
    }

    async fn update_column_title(&self, column_id: &ColumnId, title: &str) -> Result<Column> {
        let _lock = self.lock().await?;
        let mut column = self.read_column(column_id).await?;
        column.title = title.to_string();
        self.write_column(&column).await?;
        Ok(column)
    }

    async fn create_task(&self, column_id: &ColumnId, task: NewTask) -> Result<Task> {
        let _lock = self.lock().await?;
        self.read_column(column_id).await?;
        let tasks: Vec<Task> = read_all(&self.root.join(TASKS)).await?;
        let sort_order = tasks.iter().filter(|t| &t.column_id == column_id).count();

        let task = Task {
            id: TaskId::new(),
            column_id: column_id.clone(),
            title: task.title,
            description: task.description,
            assignee: task.assignee,
            due_date: task.due_date,
            priority: task.priority,
            sort_order,
            created_at: Utc::now(),
        };
        self.write_task(&task).await?;
        Ok(task)
    }

    async fn move_task(&self, task_id: &TaskId, column_id: &ColumnId, order: usize) -> Result<()> {
        let _lock = self.lock().await?;
        self.read_column(column_id).await?;
        let source = self.read_task(task_id).await?.column_id;

        let rows: Vec<Task> = read_all::<Task>(&self.root.join(TASKS))
            .await?
            .into_iter()
            .filter(|t| t.column_id == source || &t.column_id == column_id)
            .collect();
        let rows = reposition(rows, task_id, column_id, order)?;
        let mut batch = Vec::with_capacity(rows.len());
        for task in &rows {
            batch.push((self.entity_path(TASKS, "task", task.id.as_str())?, task));
        }
        write_entities(&batch).await?;
        debug!(task_id = %task_id, column_id = %column_id, order, "moved task file");
        Ok(())
    }

    async fn record_activity(&self, entry: &LogEntry) -> Result<()> {
        let _lock = self.lock().await?;
        let path = self.activity_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

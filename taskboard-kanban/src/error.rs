//! Error types for the board engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Initial fetch of a board and its columns/tasks failed
    #[error("failed to load board {board_id}: {reason}")]
    LoadFailed { board_id: String, reason: String },

    /// A create/update/move write was rejected or never reached the store
    #[error("{op} failed: {reason}")]
    WriteFailed { op: String, reason: String },

    /// Raw failure reported by a backend before it is classified
    #[error("backend error: {message}")]
    Backend { message: String },

    /// A move claimed a source column that does not hold the task
    #[error("task {task_id} is not in column {column_id}")]
    TaskNotInColumn { task_id: String, column_id: String },

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Board not found
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// No board has been loaded into the store yet
    #[error("no board loaded")]
    BoardNotLoaded,

    /// Index outside of a list
    #[error("index {index} out of range for column {column_id} with {len} tasks")]
    IndexOutOfRange {
        column_id: String,
        index: usize,
        len: usize,
    },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// Identifier that the storage layer cannot interpret
    #[error("invalid {item_type} id: {id}")]
    InvalidId { item_type: String, id: String },

    /// Input rejected before any write was attempted
    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// User-facing category of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Blocking: the board could not be shown at all
    LoadFailure,
    /// Non-blocking: a write failed, local state is kept or restored
    WriteFailure,
    /// The in-memory tree disagrees with what an event claimed
    ConsistencyViolation,
    /// Rejected input, nothing was written
    ValidationFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LoadFailure => "load failure",
            Self::WriteFailure => "write failure",
            Self::ConsistencyViolation => "consistency violation",
            Self::ValidationFailure => "validation failure",
        };
        f.write_str(label)
    }
}

impl BoardError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Wrap any failure of a write as a `WriteFailed` for `op`.
    ///
    /// Validation errors pass through unchanged so callers can still tell
    /// that nothing was attempted.
    pub fn write_failed(op: impl Into<String>, source: BoardError) -> Self {
        match source {
            err @ (Self::Validation { .. } | Self::WriteFailed { .. }) => err,
            other => Self::WriteFailed {
                op: op.into(),
                reason: other.to_string(),
            },
        }
    }

    /// Wrap a failed load
    pub fn load_failed(board_id: impl Into<String>, source: BoardError) -> Self {
        Self::LoadFailed {
            board_id: board_id.into(),
            reason: source.to_string(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid ID error
    pub fn invalid_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::InvalidId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Category used when the error is shown to a user
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LoadFailed { .. } => ErrorKind::LoadFailure,
            Self::Validation { .. } | Self::Config { .. } => ErrorKind::ValidationFailure,
            Self::TaskNotInColumn { .. }
            | Self::TaskNotFound { .. }
            | Self::ColumnNotFound { .. }
            | Self::BoardNotFound { .. }
            | Self::BoardNotLoaded
            | Self::IndexOutOfRange { .. }
            | Self::DuplicateId { .. } => ErrorKind::ConsistencyViolation,
            Self::WriteFailed { .. }
            | Self::Backend { .. }
            | Self::InvalidId { .. }
            | Self::LockBusy
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::WriteFailure,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy)
    }
}

/// Trim `value` and reject it when nothing is left.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

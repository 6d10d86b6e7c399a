//! Ordered board state engine for kanban boards
//!
//! This crate keeps a board's columns and tasks as an ordered in-memory tree,
//! reorders that tree optimistically while a task is being dragged, and
//! writes the final position to a pluggable backend once the drag ends.
//!
//! ## Overview
//!
//! - **Ordering primitives** - pure `move_within_list` / `transfer_between_lists`
//! - **Board store** - immutable snapshots, one per mutation
//! - **Drag controller** - `Idle -> Dragging -> Idle`, one write per drop
//! - **Reconciler** - commits drops and restores the tree when a write fails
//! - **Backends** - an in-memory store and a file store (YAML entities, JSONL activity)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use taskboard_kanban::{
//!     backend::InMemoryBackend, board::{CreateBoard, LoadBoard}, task::AddTask,
//!     BoardContext, EngineConfig, Execute,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = BoardContext::new(InMemoryBackend::new(), EngineConfig::default());
//!
//! let created = CreateBoard::new("Launch", "dana").execute(&ctx).await.into_result()?;
//! let board_id = created["board"]["id"].as_str().unwrap_or_default();
//! LoadBoard::new(board_id).execute(&ctx).await.into_result()?;
//!
//! AddTask::new("Write announcement").execute(&ctx).await.into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! Drags are driven through a [`BoardSession`], either event by event or by
//! feeding [`GestureEvent`]s into [`BoardSession::run`].

pub mod backend;
pub mod config;
mod context;
pub mod defaults;
pub mod drag;
mod error;
pub mod filter;
pub mod ordering;
mod outcome;
mod processor;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod types;

// Command modules
pub mod board;
pub mod column;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export Execute trait and types from operations crate
pub use taskboard_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};

pub use backend::{BoardBackend, LoadedBoard};
pub use config::{EngineConfig, MoveFailurePolicy};
pub use context::{ActivityLog, BoardContext, ErrorNotice, ErrorState, SharedStore};
pub use error::{BoardError, ErrorKind, Result};
pub use processor::BoardOperationProcessor;
pub use session::{BoardSession, GestureEvent, PendingCommit};
pub use store::BoardStore;

// Re-export commonly used types
pub use types::{
    Board, BoardId, BoardSnapshot, Column, ColumnId, ColumnWithTasks, Priority, Task, TaskId,
    UserId,
};

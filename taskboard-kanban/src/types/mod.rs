//! Core types for the board engine

mod board;
mod ids;
mod snapshot;
mod task;

// Re-export all types
pub use board::{Board, BoardPatch, Column, ColumnPatch, NewBoard};
pub use ids::{BoardId, ColumnId, TaskId, UserId};
pub use snapshot::{BoardSnapshot, ColumnWithTasks, HoverTarget};
pub use task::{NewTask, Priority, Task};

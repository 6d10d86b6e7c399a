//! # Taskboard Operations
//!
//! This crate provides the `Operation` trait for defining board commands.
//! Operations are structs where the fields ARE the parameters - no duplication.
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_operations::*;
//!
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct AddColumn {
//!     /// The column title
//!     pub title: String,
//! }
//!
//! impl_operation!(AddColumn, verb = "add", noun = "column", description = "Add a column");
//!
//! #[async_trait]
//! impl Execute<BoardContext<B>, BoardError> for AddColumn {
//!     async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
//!         // implementation returns ExecutionResult::Logged or Unlogged
//!     }
//! }
//! ```

mod execution_result;
mod log;
mod operation;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;

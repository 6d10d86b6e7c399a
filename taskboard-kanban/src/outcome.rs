//! Wrapping command results into [`ExecutionResult`]s with log entries

use crate::error::{BoardError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use taskboard_operations::{ExecutionResult, LogEntry, Operation};

/// Normalized input of a command, as recorded in its log entry
pub(crate) fn input_of<O: Serialize>(op: &O) -> Value {
    serde_json::to_value(op).unwrap_or_default()
}

/// Result of a mutating command: logged on success and on failure
pub(crate) fn logged<O: Operation>(
    op: &O,
    input: Value,
    started: Instant,
    result: Result<Value>,
) -> ExecutionResult<Value, BoardError> {
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(value) => ExecutionResult::Logged {
            value: value.clone(),
            log_entry: LogEntry::new(op.op_string(), input, value, None, duration_ms),
        },
        Err(error) => {
            let output = json!({"error": error.to_string(), "kind": error.kind()});
            ExecutionResult::Failed {
                error,
                log_entry: Some(LogEntry::new(op.op_string(), input, output, None, duration_ms)),
            }
        }
    }
}

/// Result of a read: never logged
pub(crate) fn unlogged(result: Result<Value>) -> ExecutionResult<Value, BoardError> {
    match result {
        Ok(value) => ExecutionResult::Unlogged { value },
        Err(error) => ExecutionResult::Failed {
            error,
            log_entry: None,
        },
    }
}

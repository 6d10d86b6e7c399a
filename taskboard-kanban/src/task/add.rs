//! AddTask command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::outcome::{input_of, logged};
use crate::types::{ColumnId, NewTask, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};
use tracing::info;

/// Add a task at the end of a column
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddTask {
    /// Target column; the first column of the board when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
}

impl_operation!(
    AddTask,
    verb = "add",
    noun = "task",
    description = "Create a new task on the board"
);

impl AddTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn in_column(mut self, column_id: impl Into<ColumnId>) -> Self {
        self.column_id = Some(column_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn fields(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            due_date: self.due_date,
            priority: self.priority,
        }
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for AddTask {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            // Nothing reaches the backend unless the fields are valid
            let fields = self.fields().validated()?;

            let snapshot = ctx.snapshot().await;
            if snapshot.board().is_none() {
                return Err(BoardError::BoardNotLoaded);
            }
            let column_id = match &self.column_id {
                Some(id) if snapshot.column(id).is_some() => id.clone(),
                Some(id) => return Err(BoardError::ColumnNotFound { id: id.to_string() }),
                None => snapshot
                    .columns()
                    .first()
                    .map(|c| c.id().clone())
                    .ok_or_else(|| BoardError::validation("column_id", "board has no columns"))?,
            };

            let task = ctx
                .backend()
                .create_task(&column_id, fields)
                .await
                .map_err(|e| BoardError::write_failed("add task", e))?;

            ctx.store()
                .write()
                .await
                .append_task_to_column(&column_id, task.clone())?;
            info!(task_id = %task.id, column_id = %column_id, "added task");
            Ok(serde_json::to_value(&task)?)
        }
        .await;

        logged(self, input, start, result)
    }
}

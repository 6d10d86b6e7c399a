//! RenameColumn command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{require_text, BoardError, Result};
use crate::outcome::{input_of, logged};
use crate::types::{ColumnId, ColumnPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};

/// Retitle a column of the loaded board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenameColumn {
    pub column_id: ColumnId,
    pub title: String,
}

impl_operation!(
    RenameColumn,
    verb = "rename",
    noun = "column",
    description = "Change the title of a column"
);

impl RenameColumn {
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for RenameColumn {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            let title = require_text("title", &self.title)?;
            if ctx.snapshot().await.column(&self.column_id).is_none() {
                return Err(BoardError::ColumnNotFound {
                    id: self.column_id.to_string(),
                });
            }

            let column = ctx
                .backend()
                .update_column_title(&self.column_id, &title)
                .await
                .map_err(|e| BoardError::write_failed("rename column", e))?;

            ctx.store()
                .write()
                .await
                .patch_column(&column.id, &ColumnPatch::from(&column))?;
            Ok(serde_json::to_value(&column)?)
        }
        .await;

        logged(self, input, start, result)
    }
}

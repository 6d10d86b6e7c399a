//! AddColumn command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{require_text, BoardError, Result};
use crate::outcome::{input_of, logged};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};
use tracing::info;

/// Add a column at the end of the loaded board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddColumn {
    pub title: String,
}

impl_operation!(
    AddColumn,
    verb = "add",
    noun = "column",
    description = "Add a new column to the board"
);

impl AddColumn {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for AddColumn {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            let title = require_text("title", &self.title)?;
            let board_id = ctx
                .snapshot()
                .await
                .board()
                .map(|b| b.id.clone())
                .ok_or(BoardError::BoardNotLoaded)?;

            let column = ctx
                .backend()
                .create_column(&board_id, &title)
                .await
                .map_err(|e| BoardError::write_failed("add column", e))?;

            ctx.store().write().await.append_column(column.clone())?;
            info!(board_id = %board_id, column_id = %column.id, "added column");
            Ok(serde_json::to_value(&column)?)
        }
        .await;

        logged(self, input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CreateBoard, LoadBoard};
    use crate::config::EngineConfig;
    use crate::test_support::RecordingBackend;

    async fn setup() -> BoardContext<RecordingBackend> {
        let ctx = BoardContext::new(RecordingBackend::new(), EngineConfig::default());
        let created = CreateBoard::new("Launch", "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let board_id = created["board"]["id"].as_str().unwrap();
        LoadBoard::new(board_id)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_add_column_appends() {
        let ctx = setup().await;
        let value = AddColumn::new(" Blocked ")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["title"], "Blocked");
        assert_eq!(value["sort_order"], 4);

        let snapshot = ctx.snapshot().await;
        assert_eq!(snapshot.columns().len(), 5);
        assert_eq!(snapshot.columns()[4].column.title, "Blocked");
        assert_eq!(snapshot.columns()[4].column.sort_order, 4);
    }

    #[tokio::test]
    async fn test_add_column_empty_title() {
        let ctx = setup().await;
        let writes = ctx.backend().write_calls();
        let err = AddColumn::new("").execute(&ctx).await.into_result().unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
        assert_eq!(ctx.backend().write_calls(), writes);
    }

    #[tokio::test]
    async fn test_add_column_write_failure_leaves_store() {
        let ctx = setup().await;
        let before = ctx.snapshot().await;
        ctx.backend().fail_writes("timeout");

        let result = AddColumn::new("Blocked").execute(&ctx).await;
        assert!(result.should_log());
        let err = result.into_result().unwrap_err();
        assert!(matches!(err, BoardError::WriteFailed { .. }));
        assert!(std::sync::Arc::ptr_eq(&before, &ctx.snapshot().await));
    }
}

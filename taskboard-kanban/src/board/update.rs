//! UpdateBoard command

use super::require_color;
use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{require_text, BoardError, Result};
use crate::outcome::{input_of, logged};
use crate::types::BoardPatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};
use tracing::info;

/// Update title, description or color of the loaded board
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// An empty string clears the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl_operation!(
    UpdateBoard,
    verb = "update",
    noun = "board",
    description = "Update board title, description or color"
);

impl UpdateBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn patch(&self) -> Result<BoardPatch> {
        let patch = BoardPatch {
            title: self
                .title
                .as_deref()
                .map(|t| require_text("title", t))
                .transpose()?,
            description: self.description.as_deref().map(|d| d.trim().to_string()),
            color: self.color.as_deref().map(require_color).transpose()?,
        };
        if patch.is_empty() {
            return Err(BoardError::validation("board", "nothing to update"));
        }
        Ok(patch)
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for UpdateBoard {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            let patch = self.patch()?;
            let board_id = ctx
                .snapshot()
                .await
                .board()
                .map(|b| b.id.clone())
                .ok_or(BoardError::BoardNotLoaded)?;

            let board = ctx
                .backend()
                .update_board(&board_id, &patch)
                .await
                .map_err(|e| BoardError::write_failed("update board", e))?;

            ctx.store().write().await.patch_board(board.clone())?;
            info!(board_id = %board.id, "updated board");
            Ok(serde_json::to_value(&board)?)
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
    async fn test_update_board_patches_store() {
        let ctx = setup().await;
        let value = UpdateBoard::new()
            .with_title(" Launch v2 ")
            .with_color("bg-red-500")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["title"], "Launch v2");

        let snapshot = ctx.snapshot().await;
        let board = snapshot.board().unwrap();
        assert_eq!(board.title, "Launch v2");
        assert_eq!(board.color, "bg-red-500");
    }

    #[tokio::test]
    async fn test_update_board_rejects_empty_input() {
        let ctx = setup().await;
        let writes = ctx.backend().write_calls();

        for op in [
            UpdateBoard::new(),
            UpdateBoard::new().with_title("  "),
            UpdateBoard::new().with_color("purple"),
        ] {
            let err = op.execute(&ctx).await.into_result().unwrap_err();
            assert!(matches!(err, BoardError::Validation { .. }));
        }
        assert_eq!(ctx.backend().write_calls(), writes);
    }

    #[tokio::test]
    async fn test_update_board_requires_loaded_board() {
        let ctx = BoardContext::new(RecordingBackend::new(), EngineConfig::default());
        let err = UpdateBoard::new()
            .with_title("x")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::BoardNotLoaded));
    }
}

//! CreateBoard command

use super::require_color;
use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{require_text, BoardError, Result};
use crate::outcome::{input_of, logged};
use crate::types::{NewBoard, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};
use tracing::info;

/// Create a board and seed it with the default columns
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateBoard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Palette color; the configured default when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub owner: UserId,
}

impl_operation!(
    CreateBoard,
    verb = "create",
    noun = "board",
    description = "Create a board with the default columns"
);

impl CreateBoard {
    pub fn new(title: impl Into<String>, owner: impl Into<UserId>) -> Self {
        Self {
            title: title.into(),
            description: None,
            color: None,
            owner: owner.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for CreateBoard {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            let title = require_text("title", &self.title)?;
            let color = require_color(self.color.as_deref().unwrap_or(&ctx.config().default_color))?;
            let description = self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            let board = ctx
                .backend()
                .create_board(NewBoard {
                    title,
                    description,
                    color,
                    owner: self.owner.clone(),
                })
                .await
                .map_err(|e| BoardError::write_failed("create board", e))?;

            let mut columns = Vec::with_capacity(ctx.config().default_columns.len());
            for title in &ctx.config().default_columns {
                let column = ctx
                    .backend()
                    .create_column(&board.id, title)
                    .await
                    .map_err(|e| BoardError::write_failed("create column", e))?;
                columns.push(column);
            }

            info!(board_id = %board.id, columns = columns.len(), "created board");
            Ok(json!({ "board": board, "columns": columns }))
        }
        .await;

        logged(self, input, start, result)
    }
}

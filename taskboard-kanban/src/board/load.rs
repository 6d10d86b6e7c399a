//! LoadBoard command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::outcome::unlogged;
use crate::types::BoardId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};
use tracing::{error, info};

/// Fetch a board with its columns and tasks and make it the current tree
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadBoard {
    pub board_id: BoardId,
}

impl_operation!(
    LoadBoard,
    verb = "load",
    noun = "board",
    description = "Load a board with its columns and tasks"
);

impl LoadBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for LoadBoard {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let result: Result<Value> = async {
            let loaded = ctx
                .backend()
                .load_board_with_columns_and_tasks(&self.board_id)
                .await;

            let mut store = ctx.store().write().await;
            match loaded {
                Ok(loaded) => {
                    let loaded = loaded.sorted();
                    let snapshot = store.replace_all(loaded.board, loaded.columns);
                    info!(
                        board_id = %self.board_id,
                        columns = snapshot.columns().len(),
                        tasks = snapshot.task_count(),
                        "loaded board"
                    );
                    Ok(serde_json::to_value(&*snapshot)?)
                }
                Err(source) => {
                    // No partial board: whatever was shown before is gone too
                    store.clear();
                    let err = BoardError::load_failed(self.board_id.as_str(), source);
                    error!(board_id = %self.board_id, error = %err, "board load failed");
                    Err(err)
                }
            }
        }
        .await;

        unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::board::CreateBoard;
    use crate::config::EngineConfig;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_load_board_replaces_tree() {
        let ctx = BoardContext::new(InMemoryBackend::new(), EngineConfig::default());
        let created = CreateBoard::new("Launch", "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let board_id = created["board"]["id"].as_str().unwrap();

        let result = LoadBoard::new(board_id).execute(&ctx).await;
        assert!(!result.should_log());
        let value = result.into_result().unwrap();

        assert_eq!(value["board"]["title"], "Launch");
        let titles: Vec<_> = value["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["To Do", "In Progress", "Review", "Done"]);
        assert!(ctx.store().read().await.is_loaded());
    }

    #[tokio::test]
    async fn test_load_failure_clears_store() {
        let ctx = BoardContext::new(InMemoryBackend::new(), EngineConfig::default());
        let created = CreateBoard::new("Launch", "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let board_id = created["board"]["id"].as_str().unwrap();
        LoadBoard::new(board_id).execute(&ctx).await.into_result().unwrap();

        let err = LoadBoard::new("999")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoadFailure);
        let snapshot = ctx.snapshot().await;
        assert!(snapshot.board().is_none());
        assert!(snapshot.columns().is_empty());
    }
}

//! ListBoards command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::filter::{BoardFilter, BoardStats};
use crate::outcome::unlogged;
use crate::types::UserId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};

/// List the boards of an owner, newest first.
///
/// Output is `{"boards": [...], "stats": {...}}`. The stats count all of
/// the owner's boards, whatever the filter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListBoards {
    pub owner: UserId,
    #[serde(default)]
    pub filter: BoardFilter,
}

impl_operation!(
    ListBoards,
    verb = "list",
    noun = "boards",
    description = "List boards, newest first"
);

impl ListBoards {
    pub fn new(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            filter: BoardFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: BoardFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for ListBoards {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let result: Result<Value> = async {
            let boards = ctx.backend().list_boards(&self.owner).await?;
            let stats = BoardStats::of(&boards, Utc::now());
            let boards = self.filter.apply(boards);
            Ok(json!({ "boards": boards, "stats": stats }))
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
    use taskboard_operations::Operation;

    #[tokio::test]
    async fn test_list_boards_filters_by_owner_and_search() {
        let ctx = BoardContext::new(InMemoryBackend::new(), EngineConfig::default());
        for (title, owner) in [("Launch", "alice"), ("Hiring", "alice"), ("Launch", "bob")] {
            CreateBoard::new(title, owner)
                .execute(&ctx)
                .await
                .into_result()
                .unwrap();
        }

        let op = ListBoards::new("alice");
        assert_eq!(op.op_string(), "list boards");
        let result = op.execute(&ctx).await;
        assert!(!result.should_log());
        let all = result.into_result().unwrap();
        assert_eq!(all["boards"].as_array().unwrap().len(), 2);
        assert_eq!(all["boards"][0]["title"], "Hiring");
        assert_eq!(all["stats"]["total"], 2);
        assert_eq!(all["stats"]["recently_updated"], 2);

        let filtered = ListBoards::new("alice")
            .with_filter(BoardFilter {
                search: "LAUN".into(),
                ..Default::default()
            })
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(filtered["boards"].as_array().unwrap().len(), 1);
        assert_eq!(filtered["boards"][0]["owner"], "alice");
        assert_eq!(filtered["stats"]["total"], 2);
    }
}

//! MoveTask command

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::drag::{DragOrigin, DropCommit};
use crate::error::{BoardError, Result};
use crate::outcome::{input_of, logged};
use crate::types::{ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, impl_operation, Execute, ExecutionResult};

/// Move a task to a position in a column without a gesture.
///
/// The store is updated first and the write follows, exactly like a drop;
/// a failed write is handled by the configured failure policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveTask {
    pub task_id: TaskId,
    pub column_id: ColumnId,
    /// Position in the destination column, clamped to its length
    #[serde(default)]
    pub index: usize,
}

impl_operation!(
    MoveTask,
    verb = "move",
    noun = "task",
    description = "Move a task to a different column or position"
);

impl MoveTask {
    pub fn new(task_id: impl Into<TaskId>, column_id: impl Into<ColumnId>, index: usize) -> Self {
        Self {
            task_id: task_id.into(),
            column_id: column_id.into(),
            index,
        }
    }

    /// Move to the end of `column_id`
    pub fn to_column(task_id: impl Into<TaskId>, column_id: impl Into<ColumnId>) -> Self {
        Self::new(task_id, column_id, usize::MAX)
    }
}

#[async_trait]
impl<B: BoardBackend> Execute<BoardContext<B>, BoardError> for MoveTask {
    async fn execute(&self, ctx: &BoardContext<B>) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = input_of(self);

        let result: Result<Value> = async {
            let commit = {
                let mut store = ctx.store().write().await;
                let snapshot = store.snapshot();
                let (ci, from) =
                    snapshot
                        .locate_task(&self.task_id)
                        .ok_or_else(|| BoardError::TaskNotFound {
                            id: self.task_id.to_string(),
                        })?;
                let source = snapshot.columns()[ci].id().clone();

                let next = store.move_task_across_columns(
                    &self.task_id,
                    &source,
                    &self.column_id,
                    self.index,
                )?;
                let (_, index) = next
                    .locate_task(&self.task_id)
                    .ok_or_else(|| BoardError::TaskNotFound {
                        id: self.task_id.to_string(),
                    })?;
                let claim = store.claim_task(&self.task_id);

                DropCommit {
                    task_id: self.task_id.clone(),
                    column_id: self.column_id.clone(),
                    index,
                    origin: DragOrigin {
                        column_id: source,
                        index: from,
                    },
                    claim,
                }
            };

            ctx.reconciler().commit_move(&commit).await?;
            Ok(serde_json::to_value(&commit)?)
        }
        .await;

        logged(self, input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CreateBoard, LoadBoard};
    use crate::config::{EngineConfig, MoveFailurePolicy};
    use crate::task::AddTask;
    use crate::test_support::{column_id, task_id, task_titles, RecordingBackend};

    async fn setup(policy: MoveFailurePolicy) -> BoardContext<RecordingBackend> {
        let config = EngineConfig::default().with_move_failure(policy);
        let ctx = BoardContext::new(RecordingBackend::new(), config);
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
        for title in ["a", "b"] {
            AddTask::new(title).execute(&ctx).await.into_result().unwrap();
        }
        ctx
    }

    #[tokio::test]
    async fn test_move_task_to_column_end() {
        let ctx = setup(MoveFailurePolicy::Restore).await;
        let snapshot = ctx.snapshot().await;
        let a = task_id(&snapshot, "a");
        let done = column_id(&snapshot, "Done");

        let value = MoveTask::to_column(a.clone(), done.clone())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["index"], 0);
        assert_eq!(value["origin"]["index"], 0);

        let snapshot = ctx.snapshot().await;
        assert_eq!(task_titles(&snapshot, "To Do"), ["b"]);
        assert_eq!(task_titles(&snapshot, "Done"), ["a"]);

        let moves = ctx.backend().moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].task_id, a);
        assert_eq!(moves[0].column_id, done);
        assert_eq!(moves[0].order, 0);
    }

    #[tokio::test]
    async fn test_move_task_within_column() {
        let ctx = setup(MoveFailurePolicy::Restore).await;
        let snapshot = ctx.snapshot().await;
        let b = task_id(&snapshot, "b");
        let todo = column_id(&snapshot, "To Do");

        MoveTask::new(b, todo, 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(task_titles(&*ctx.snapshot().await, "To Do"), ["b", "a"]);
    }

    #[tokio::test]
    async fn test_move_task_failure_restores() {
        let ctx = setup(MoveFailurePolicy::Restore).await;
        ctx.backend().fail_moves("connection reset");
        let snapshot = ctx.snapshot().await;
        let a = task_id(&snapshot, "a");
        let review = column_id(&snapshot, "Review");

        let result = MoveTask::new(a, review, 0).execute(&ctx).await;
        assert!(result.should_log());
        let err = result.into_result().unwrap_err();
        assert!(matches!(err, BoardError::WriteFailed { .. }));

        let snapshot = ctx.snapshot().await;
        assert_eq!(task_titles(&snapshot, "To Do"), ["a", "b"]);
        assert!(task_titles(&snapshot, "Review").is_empty());
        assert!(ctx.errors().current().is_some());
    }

    #[tokio::test]
    async fn test_move_unknown_task() {
        let ctx = setup(MoveFailurePolicy::Restore).await;
        let done = column_id(&*ctx.snapshot().await, "Done");
        let err = MoveTask::new("404", done, 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::TaskNotFound { .. }));
        assert!(ctx.backend().moves().is_empty());
    }
}

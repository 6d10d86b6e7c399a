//! Operation processor for board commands

use crate::backend::BoardBackend;
use crate::context::BoardContext;
use crate::error::BoardError;
use taskboard_operations::{async_trait, Execute, Operation, OperationProcessor, Value};
use tracing::{debug, warn};

/// Runs board commands and takes care of their log entries.
///
/// A log entry is stamped with the actor, pushed onto the context's
/// activity log and handed to the backend's audit trail. Failed commands
/// are also published on the context's error state.
#[derive(Debug, Clone, Default)]
pub struct BoardOperationProcessor {
    actor: Option<String>,
}

impl BoardOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `actor` on every log entry, overriding the configured one
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl<B: BoardBackend> OperationProcessor<BoardContext<B>, BoardError> for BoardOperationProcessor {
    async fn process<O>(&self, operation: &O, ctx: &BoardContext<B>) -> Result<Value, BoardError>
    where
        O: Execute<BoardContext<B>, BoardError> + Operation + Send + Sync,
    {
        let op = operation.op_string();
        debug!(op = %op, "processing operation");

        let (result, log_entry) = operation.execute(ctx).await.split();

        if let Some(mut entry) = log_entry {
            let actor = self.actor.clone().or_else(|| ctx.config().actor.clone());
            if let Some(actor) = actor {
                entry = entry.with_actor(actor);
            }
            if let Err(err) = ctx.backend().record_activity(&entry).await {
                warn!(op = %op, error = %err, "failed to record activity");
            }
            ctx.activity().push(entry).await;
        }

        if let Err(err) = &result {
            warn!(op = %op, kind = %err.kind(), error = %err, "operation failed");
            ctx.errors().record(err);
        }

        result
    }
}

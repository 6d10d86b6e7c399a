//! Processor trait: executes operations and handles their log entries

use crate::{Execute, Operation};
use async_trait::async_trait;
use serde_json::Value;

/// Runs operations against a context and takes care of auditing.
///
/// Implementations decide where log entries go (memory, files) and how
/// failures are surfaced; callers only see the final `Result`.
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    async fn process<O>(&self, operation: &O, ctx: &C) -> Result<Value, E>
    where
        O: Execute<C, E> + Operation + Send + Sync;
}

//! The `Operation` and `Execute` traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Static metadata describing a command
pub trait Operation {
    /// The action, e.g. "add"
    fn verb(&self) -> &'static str;

    /// The entity acted upon, e.g. "task"
    fn noun(&self) -> &'static str;

    /// Human readable summary
    fn description(&self) -> &'static str;

    /// Canonical op string used in log entries ("add task")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context `C`, failing with `E`
#[async_trait]
pub trait Execute<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

/// Implement [`Operation`] for a struct from its verb, noun and description.
#[macro_export]
macro_rules! impl_operation {
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $desc:literal) => {
        impl $crate::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }

            fn noun(&self) -> &'static str {
                $noun
            }

            fn description(&self) -> &'static str {
                $desc
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RenameColumn;

    impl_operation!(
        RenameColumn,
        verb = "rename",
        noun = "column",
        description = "Rename a column"
    );

    #[test]
    fn test_op_string() {
        let op = RenameColumn;
        assert_eq!(op.verb(), "rename");
        assert_eq!(op.noun(), "column");
        assert_eq!(op.description(), "Rename a column");
        assert_eq!(op.op_string(), "rename column");
    }
}

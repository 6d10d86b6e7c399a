//! `taskboard task ...`

use super::CliContext;
use crate::cli::TaskCommands;
use anyhow::Result;
use taskboard_kanban::task::{AddTask, MoveTask};

pub async fn execute(ctx: &CliContext, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            board,
            title,
            column,
            description,
            assignee,
            due,
            priority,
        } => {
            ctx.load(&board).await?;
            let op = AddTask {
                column_id: column.map(Into::into),
                title,
                description,
                assignee,
                due_date: due,
                priority: priority.into(),
            };
            let value = ctx.process(&op).await?;
            ctx.emit(&value, || {
                let id = value["id"].as_str().unwrap_or_default();
                println!("Added task {id}");
            })
        }
        TaskCommands::Move {
            board,
            task,
            column,
            index,
        } => {
            ctx.load(&board).await?;
            let op = match index {
                Some(index) => MoveTask::new(task, column, index),
                None => MoveTask::to_column(task, column),
            };
            let value = ctx.process(&op).await?;
            ctx.emit(&value, || {
                println!(
                    "Moved task {} to column {} at position {}",
                    value["task_id"].as_str().unwrap_or_default(),
                    value["column_id"].as_str().unwrap_or_default(),
                    value["index"]
                );
            })
        }
    }
}

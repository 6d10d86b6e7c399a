//! `taskboard column ...`

use super::CliContext;
use crate::cli::ColumnCommands;
use anyhow::Result;
use taskboard_kanban::column::{AddColumn, RenameColumn};

pub async fn execute(ctx: &CliContext, command: ColumnCommands) -> Result<()> {
    match command {
        ColumnCommands::Add { board, title } => {
            ctx.load(&board).await?;
            let value = ctx.process(&AddColumn::new(title)).await?;
            ctx.emit(&value, || {
                let id = value["id"].as_str().unwrap_or_default();
                println!("Added column {id}");
            })
        }
        ColumnCommands::Rename {
            board,
            column,
            title,
        } => {
            ctx.load(&board).await?;
            let value = ctx.process(&RenameColumn::new(column, title)).await?;
            ctx.emit(&value, || {
                let title = value["title"].as_str().unwrap_or_default();
                println!("Renamed column to {title}");
            })
        }
    }
}

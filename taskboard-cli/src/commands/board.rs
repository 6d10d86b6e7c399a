//! `taskboard board ...`

use super::CliContext;
use crate::cli::{BoardCommands, TaskFilterArgs};
use crate::render;
use anyhow::Result;
use serde_json::json;
use taskboard_kanban::{
    board::{CreateBoard, ListBoards, UpdateBoard},
    filter::{BoardFilter, BoardStats, TaskFilter},
    Board,
};

pub async fn execute(ctx: &CliContext, command: BoardCommands) -> Result<()> {
    match command {
        BoardCommands::Create {
            title,
            description,
            color,
            owner,
        } => {
            let mut op = CreateBoard::new(title, ctx.owner(owner.as_deref()));
            if let Some(description) = description {
                op = op.with_description(description);
            }
            if let Some(color) = color {
                op = op.with_color(color);
            }
            let value = ctx.process(&op).await?;
            ctx.emit(&value, || {
                let id = value["board"]["id"].as_str().unwrap_or_default();
                println!("Created board {id}");
            })
        }
        BoardCommands::List {
            owner,
            search,
            from,
            to,
        } => {
            let filter = BoardFilter {
                search: search.unwrap_or_default(),
                created_from: from,
                created_to: to,
            };
            let op = ListBoards::new(ctx.owner(owner.as_deref())).with_filter(filter);
            let value = ctx.process(&op).await?;
            let boards: Vec<Board> = serde_json::from_value(value["boards"].clone())?;
            let stats: BoardStats = serde_json::from_value(value["stats"].clone())?;
            ctx.emit(&value, || {
                println!("{}", render::board_stats(&stats));
                if boards.is_empty() {
                    println!("No boards found");
                } else {
                    println!("{}", render::boards_table(&boards));
                }
            })
        }
        BoardCommands::Show { board, filter } => {
            let snapshot = ctx.load(&board).await?;
            let filter = task_filter(filter);
            let columns = filter.apply(&snapshot);
            let value = json!({ "board": snapshot.board(), "columns": columns });
            ctx.emit(&value, || {
                if let Some(board) = snapshot.board() {
                    println!("{}", render::board_heading(board, filter.active_count()));
                }
                println!("{}", render::columns_table(&columns));
            })
        }
        BoardCommands::Update {
            board,
            title,
            description,
            color,
        } => {
            ctx.load(&board).await?;
            let op = UpdateBoard {
                title,
                description,
                color,
            };
            let value = ctx.process(&op).await?;
            ctx.emit(&value, || {
                let title = value["title"].as_str().unwrap_or_default();
                println!("Updated board {board} ({title})");
            })
        }
    }
}

fn task_filter(args: TaskFilterArgs) -> TaskFilter {
    TaskFilter {
        priorities: args.priorities.into_iter().map(Into::into).collect(),
        assignees: args.assignees,
        due_date: args.due,
    }
}

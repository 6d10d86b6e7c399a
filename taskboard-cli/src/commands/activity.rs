//! `taskboard activity`

use super::CliContext;
use crate::render;
use anyhow::Result;

pub async fn execute(ctx: &CliContext, limit: Option<usize>) -> Result<()> {
    let entries = ctx.board.backend().read_activity(limit).await?;
    let value = serde_json::to_value(&entries)?;
    ctx.emit(&value, || {
        if entries.is_empty() {
            println!("No activity yet");
        } else {
            println!("{}", render::activity_table(&entries));
        }
    })
}

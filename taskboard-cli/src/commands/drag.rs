//! `taskboard drag`: replay gesture events against a board

use super::CliContext;
use crate::render;
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::path::Path;
use taskboard_kanban::{BoardSession, GestureEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 64;

pub async fn execute(ctx: &CliContext, board: &str, file: Option<&Path>) -> Result<()> {
    ctx.load(board).await?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match file {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut session = BoardSession::new(ctx.board.clone());
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let (read, pending) = tokio::join!(feed(reader, tx), session.run(rx, token));

    let mut failed = 0;
    let drops = pending.len();
    for commit in pending {
        if let Err(err) = commit.wait().await {
            tracing::warn!(error = %err, "drop was not saved");
            failed += 1;
        }
    }
    read?;

    let snapshot = ctx.board.snapshot().await;
    let value = json!({ "drops": drops, "failed": failed, "board": &*snapshot });
    ctx.emit(&value, || {
        println!(
            "{}",
            render::columns_table(snapshot.columns().iter().map(|c| c.as_ref()))
        );
        println!("{drops} drop(s) committed, {failed} failed");
    })?;

    if failed > 0 {
        bail!("{failed} of {drops} drop(s) could not be saved");
    }
    Ok(())
}

/// Parse one event per non-blank line and forward it to the session.
/// Stops at the first malformed line.
async fn feed(
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    tx: mpsc::Sender<GestureEvent>,
) -> Result<()> {
    let mut lines = reader.lines();
    let mut number = 0;
    while let Some(line) = lines.next_line().await? {
        number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: GestureEvent = serde_json::from_str(line)
            .with_context(|| format!("line {number}: not a gesture event"))?;
        if tx.send(event).await.is_err() {
            break;
        }
    }
    Ok(())
}

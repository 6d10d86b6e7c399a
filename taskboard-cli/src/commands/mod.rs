//! Command dispatch and the context shared by every command

mod activity;
mod board;
mod column;
mod drag;
mod task;

use crate::cli::{Cli, Commands, OutputFormat};
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use taskboard_kanban::{
    backend::FileBackend, board::LoadBoard, BoardContext, BoardOperationProcessor,
    BoardSnapshot, EngineConfig, Execute, Operation, OperationProcessor,
};

/// Owner used when neither `--owner` nor an actor is given
const DEFAULT_OWNER: &str = "local";

/// Everything a command needs: the engine context over the data directory
/// and the global output settings
pub struct CliContext {
    pub board: BoardContext<FileBackend>,
    pub processor: BoardOperationProcessor,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl CliContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config =
            EngineConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
        if let Some(data_dir) = &cli.data_dir {
            config = config.with_data_dir(data_dir);
        }
        if let Some(actor) = &cli.actor {
            config = config.with_actor(actor);
        }
        tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");

        let backend = FileBackend::new(&config.data_dir);
        Ok(Self {
            board: BoardContext::new(backend, config),
            processor: BoardOperationProcessor::new(),
            format: cli.format,
            quiet: cli.quiet,
        })
    }

    /// `--owner`, else the configured actor, else [`DEFAULT_OWNER`]
    pub fn owner(&self, owner: Option<&str>) -> String {
        owner
            .map(str::to_string)
            .or_else(|| self.board.config().actor.clone())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string())
    }

    /// Run an operation through the processor
    pub async fn process<O>(&self, operation: &O) -> Result<Value>
    where
        O: Execute<BoardContext<FileBackend>, taskboard_kanban::BoardError>
            + Operation
            + Send
            + Sync,
    {
        self.processor
            .process(operation, &self.board)
            .await
            .with_context(|| format!("{} failed", operation.op_string()))
    }

    /// Load `board_id` into the store
    pub async fn load(&self, board_id: &str) -> Result<Arc<BoardSnapshot>> {
        self.process(&LoadBoard::new(board_id)).await?;
        Ok(self.board.snapshot().await)
    }

    /// Print `value` as JSON, or run `table` for table output
    pub fn emit(&self, value: &Value, table: impl FnOnce()) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => table(),
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::new(&cli)?;

    match cli.command {
        Commands::Board { subcommand } => board::execute(&ctx, subcommand).await,
        Commands::Column { subcommand } => column::execute(&ctx, subcommand).await,
        Commands::Task { subcommand } => task::execute(&ctx, subcommand).await,
        Commands::Drag { board, file } => drag::execute(&ctx, &board, file.as_deref()).await,
        Commands::Activity { limit } => activity::execute(&ctx, limit).await,
    }
}

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskboard_kanban::Priority;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// clap-facing mirror of [`Priority`]
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Kanban boards with drag-and-drop ordering, stored as files")]
#[command(long_about = "
taskboard keeps kanban boards as YAML files under a data directory
(default .taskboard) and replays drag gestures against them.

Global arguments can be used with any command:
  --data-dir    Root of the board files
  --config      Explicit taskboard.{toml,yaml,json}
  --actor       Name recorded in the activity log
  --format      Output format (table, json)

Example usage:
  taskboard board create \"Launch\"              # Create a board with default columns
  taskboard board show <BOARD_ID>              # Show columns and tasks
  taskboard task add --board <BOARD_ID> \"Write copy\"
  taskboard drag --board <BOARD_ID> events.jsonl
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory of the board files (overrides `data_dir` / TASKBOARD_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file to use instead of discovery
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Actor recorded on activity entries
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, list, show and update boards
    Board {
        #[command(subcommand)]
        subcommand: BoardCommands,
    },
    /// Add and rename columns
    Column {
        #[command(subcommand)]
        subcommand: ColumnCommands,
    },
    /// Add and move tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Replay gesture events (JSON lines) against a board
    #[command(long_about = "
Reads one gesture event per line and feeds it to a drag session:

  {\"event\":\"start\",\"active\":\"<TASK_ID>\"}
  {\"event\":\"over\",\"active\":\"<TASK_ID>\",\"over\":\"<TASK_ID or column-<COLUMN_ID>>\"}
  {\"event\":\"end\",\"active\":\"<TASK_ID>\",\"over\":\"column-<COLUMN_ID>\"}
  {\"event\":\"cancel\",\"active\":\"<TASK_ID>\"}

Every completed drop is written once. The board is printed afterwards.
Reads stdin when FILE is omitted or '-'.
")]
    Drag {
        /// Board to drag on
        #[arg(long)]
        board: String,
        /// File with gesture events
        file: Option<PathBuf>,
    },
    /// Show recent activity
    Activity {
        /// Number of entries to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Create a board seeded with the default columns
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Owner of the board; defaults to the actor
        #[arg(long)]
        owner: Option<String>,
    },
    /// List boards of an owner, newest first
    List {
        /// Owner of the boards; defaults to the actor
        #[arg(long)]
        owner: Option<String>,
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
        /// Created on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Created on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show a board with its columns and tasks
    Show {
        board: String,
        #[command(flatten)]
        filter: TaskFilterArgs,
    },
    /// Update title, description or color
    Update {
        board: String,
        #[arg(long)]
        title: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFilterArgs {
    /// Only show these priorities
    #[arg(long = "priority", value_enum)]
    pub priorities: Vec<PriorityArg>,
    /// Only show tasks assigned to these people
    #[arg(long = "assignee")]
    pub assignees: Vec<String>,
    /// Only show tasks due on this day (YYYY-MM-DD); undated tasks are kept
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// Append a column to a board
    Add {
        #[arg(long)]
        board: String,
        title: String,
    },
    /// Rename a column
    Rename {
        #[arg(long)]
        board: String,
        column: String,
        title: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task at the end of a column
    Add {
        #[arg(long)]
        board: String,
        title: String,
        /// Column to add to; the first column when omitted
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, value_enum, default_value = "medium")]
        priority: PriorityArg,
    },
    /// Move a task to a column and position
    Move {
        #[arg(long)]
        board: String,
        task: String,
        column: String,
        /// Position in the column; the end when omitted
        #[arg(long)]
        index: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_add() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "task",
            "add",
            "--board",
            "b1",
            "Write copy",
            "--priority",
            "high",
            "--due",
            "2024-05-03",
        ])
        .unwrap();

        let Commands::Task {
            subcommand:
                TaskCommands::Add {
                    board,
                    title,
                    priority,
                    due,
                    column,
                    ..
                },
        } = cli.command
        else {
            panic!("expected task add");
        };
        assert_eq!(board, "b1");
        assert_eq!(title, "Write copy");
        assert_eq!(priority, PriorityArg::High);
        assert_eq!(due, NaiveDate::from_ymd_opt(2024, 5, 3));
        assert!(column.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "board",
            "list",
            "--format",
            "json",
            "--data-dir",
            "/tmp/boards",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/boards")));
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["taskboard", "board", "show", "b1", "--due", "tomorrow"]).is_err());
    }
}

//! Table rendering for command output

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use taskboard_kanban::{filter::BoardStats, Board, ColumnWithTasks, LogEntry};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn boards_table(boards: &[Board]) -> Table {
    let mut table = table(vec!["ID", "Title", "Color", "Created"]);
    for board in boards {
        table.add_row(vec![
            Cell::new(&board.id),
            Cell::new(&board.title),
            Cell::new(&board.color),
            Cell::new(board.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn board_stats(stats: &BoardStats) -> String {
    format!(
        "Total boards: {}   Updated this week: {}",
        stats.total, stats.recently_updated
    )
}

pub fn board_heading(board: &Board, active_filters: usize) -> String {
    let mut heading = format!("{} ({})", board.title, board.id);
    if let Some(description) = &board.description {
        heading.push_str(&format!("\n{description}"));
    }
    if active_filters > 0 {
        heading.push_str(&format!("\n{active_filters} filter(s) active"));
    }
    heading
}

/// One row per task, grouped by column in board order. Empty columns get
/// a single row so they still show up.
pub fn columns_table<'a>(columns: impl IntoIterator<Item = &'a ColumnWithTasks>) -> Table {
    let mut table = table(vec!["Column", "#", "Task", "Priority", "Assignee", "Due", "ID"]);
    for column in columns {
        let label = format!("{} ({})", column.column.title, column.column.id);
        if column.tasks.is_empty() {
            table.add_row(vec![label.as_str(), "", "-", "", "", "", ""]);
            continue;
        }
        for (index, task) in column.tasks.iter().enumerate() {
            let first = if index == 0 { label.as_str() } else { "" };
            table.add_row(vec![
                Cell::new(first),
                Cell::new(index),
                Cell::new(&task.title),
                Cell::new(task.priority),
                Cell::new(task.assignee.as_deref().unwrap_or("")),
                Cell::new(task.due_date.map(|d| d.to_string()).unwrap_or_default()),
                Cell::new(&task.id),
            ]);
        }
    }
    table
}

pub fn activity_table(entries: &[LogEntry]) -> Table {
    let mut table = table(vec!["When", "Op", "Actor", "ms", "Result"]);
    for entry in entries {
        let result = match entry.error_message() {
            Some(error) => format!("error: {error}"),
            None => "ok".to_string(),
        };
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&entry.op),
            Cell::new(entry.actor.as_deref().unwrap_or("")),
            Cell::new(entry.duration_ms),
            Cell::new(result),
        ]);
    }
    table
}

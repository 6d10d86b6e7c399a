//! Built-in defaults for new boards

/// Colors a board may carry
pub const BOARD_COLORS: [&str; 12] = [
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-red-500",
    "bg-purple-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-gray-500",
    "bg-orange-500",
    "bg-teal-500",
    "bg-cyan-500",
    "bg-emerald-500",
];

/// Color of a board created without one
pub const DEFAULT_BOARD_COLOR: &str = "bg-blue-500";

/// Columns seeded into every new board, in order
pub const DEFAULT_COLUMNS: [&str; 4] = ["To Do", "In Progress", "Review", "Done"];

/// Prefix tagging a hover id as "drop directly on this column"
pub const COLUMN_DROP_PREFIX: &str = "column-";

/// Window for counting a board as recently updated
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Entries kept by the in-memory activity log
pub const DEFAULT_ACTIVITY_LIMIT: usize = 200;

/// True when `color` is one of [`BOARD_COLORS`]
pub fn is_board_color(color: &str) -> bool {
    BOARD_COLORS.contains(&color)
}

/// Hover id of a column's drop zone
pub fn column_drop_id(prefix: &str, column_id: &str) -> String {
    format!("{prefix}{column_id}")
}

//! Board commands

mod create;
mod list;
mod load;
mod update;

pub use create::CreateBoard;
pub use list::ListBoards;
pub use load::LoadBoard;
pub use update::UpdateBoard;

use crate::defaults::{is_board_color, BOARD_COLORS};
use crate::error::{BoardError, Result};

/// Reject colors outside the palette
pub(crate) fn require_color(color: &str) -> Result<String> {
    let color = color.trim();
    if !is_board_color(color) {
        return Err(BoardError::validation(
            "color",
            format!("'{color}' is not one of {}", BOARD_COLORS.join(", ")),
        ));
    }
    Ok(color.to_string())
}

//! Board-level types: Board, Column and their patches

use super::ids::{BoardId, ColumnId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board metadata. Columns and tasks are loaded separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Color tag, one of [`crate::defaults::BOARD_COLORS`]
    pub color: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Apply a patch, bumping `updated_at`
    pub fn apply(&mut self, patch: &BoardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Fields supplied when creating a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub owner: UserId,
}

/// Partial update of a board; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl BoardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.color.is_none()
    }
}

/// A column is one workflow stage of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    /// Position among the board's columns. Persisted values may have gaps;
    /// in memory it always equals the array index.
    pub sort_order: usize,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ColumnPatch {
    /// Patch that renames a column
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Apply to `column`. Returns true when something changed.
    pub fn apply(&self, column: &mut Column) -> bool {
        match &self.title {
            Some(title) if *title != column.title => {
                column.title = title.clone();
                true
            }
            _ => false,
        }
    }
}

impl From<&Column> for ColumnPatch {
    /// Patch carrying the server-confirmed fields of `column`
    fn from(column: &Column) -> Self {
        Self::title(column.title.clone())
    }
}

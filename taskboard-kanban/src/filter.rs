//! View filters for tasks and boards.
//!
//! Filters never touch the store: they produce filtered copies for
//! display while drags keep operating on the full tree.

use crate::defaults::RECENT_ACTIVITY_DAYS;
use crate::types::{Board, BoardSnapshot, ColumnWithTasks, Priority, Task};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Narrow the tasks shown on a board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    /// Show only these priorities; empty shows all
    pub priorities: Vec<Priority>,
    /// Show only tasks assigned to one of these people (case-insensitive)
    pub assignees: Vec<String>,
    /// Show tasks due on this day. Tasks without a due date always pass.
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        if !self.priorities.contains(&priority) {
            self.priorities.push(priority);
        }
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignees.push(assignee.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Number of active criteria, as shown on a filter badge
    pub fn active_count(&self) -> usize {
        self.priorities.len() + self.assignees.len() + usize::from(self.due_date.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }

        if !self.assignees.is_empty() {
            let assigned = task.assignee.as_deref().is_some_and(|assignee| {
                self.assignees
                    .iter()
                    .any(|wanted| wanted.trim().eq_ignore_ascii_case(assignee.trim()))
            });
            if !assigned {
                return false;
            }
        }

        match (self.due_date, task.due_date) {
            (Some(wanted), Some(due)) => wanted == due,
            _ => true,
        }
    }

    /// Filtered copy of every column, in board order
    pub fn apply(&self, snapshot: &BoardSnapshot) -> Vec<ColumnWithTasks> {
        snapshot
            .columns()
            .iter()
            .map(|column| ColumnWithTasks {
                column: column.column.clone(),
                tasks: column
                    .tasks
                    .iter()
                    .filter(|t| self.matches(t))
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}

/// Narrow a list of boards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardFilter {
    /// Case-insensitive substring of the title
    pub search: String,
    /// Created on or after this day
    pub created_from: Option<NaiveDate>,
    /// Created on or before this day
    pub created_to: Option<NaiveDate>,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.created_from.is_none() && self.created_to.is_none()
    }

    pub fn matches(&self, board: &Board) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty() && !board.title.to_lowercase().contains(&search) {
            return false;
        }

        let created = board.created_at.date_naive();
        self.created_from.map_or(true, |from| created >= from)
            && self.created_to.map_or(true, |to| created <= to)
    }

    pub fn apply(&self, boards: Vec<Board>) -> Vec<Board> {
        boards.into_iter().filter(|b| self.matches(b)).collect()
    }
}

/// Summary counts over an owner's boards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total: usize,
    /// Boards updated within the last week, as of `now`
    pub recently_updated: usize,
}

impl BoardStats {
    pub fn of(boards: &[Board], now: DateTime<Utc>) -> Self {
        let since = now - Duration::days(RECENT_ACTIVITY_DAYS);
        Self {
            total: boards.len(),
            recently_updated: boards.iter().filter(|b| b.updated_at > since).count(),
        }
    }
}

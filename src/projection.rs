//! The board rendered as the DOM attribute contract the page script applies.

use crate::domain::{Board, Column};
use serde::Serialize;

pub const COLUMN_ID_ATTR: &str = "data-column-id";
pub const DRAGGABLE_ATTR: &str = "data-draggable";
pub const TASK_ID_ATTR: &str = "data-task-id";
pub const COUNT_FOR_ATTR: &str = "data-count-for";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardProjection {
    pub board_id: String,
    pub columns: Vec<ColumnProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProjection {
    pub column_id: String,
    pub draggable: bool,
    pub tasks: Vec<String>,
    pub count: usize,
    pub wip_exceeded: bool,
}

impl From<&Column> for ColumnProjection {
    fn from(column: &Column) -> Self {
        Self {
            column_id: column.id.to_string(),
            draggable: column.drag_enabled,
            tasks: column.tasks().iter().map(|t| t.to_string()).collect(),
            count: column.badge(),
            wip_exceeded: column.wip_exceeded(),
        }
    }
}

impl From<&Board> for BoardProjection {
    fn from(board: &Board) -> Self {
        Self {
            board_id: board.id.to_string(),
            columns: board.columns.iter().map(ColumnProjection::from).collect(),
        }
    }
}

impl ColumnProjection {
    /// Attributes for the column container element
    pub fn column_attrs(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![(COLUMN_ID_ATTR, self.column_id.clone())];
        if self.draggable {
            attrs.push((DRAGGABLE_ATTR, "true".to_string()));
        }
        attrs
    }

    /// Selector locating this column's count badge
    pub fn badge_selector(&self) -> String {
        format!("[{}=\"{}\"]", COUNT_FOR_ATTR, self.column_id)
    }
}

impl BoardProjection {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// True when every badge shows the number of tasks in its column
    pub fn badges_consistent(&self) -> bool {
        self.columns.iter().all(|c| c.count == c.tasks.len())
    }
}

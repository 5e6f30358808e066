use crate::domain::task::TaskId;
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a board root element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a column within a board (`data-column-id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ColumnId {
    type Err = SyncError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SyncError::InvalidColumnId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where a task sits: its owning column and zero-based index within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPosition {
    pub column: ColumnId,
    pub index: usize,
}

impl TaskPosition {
    pub fn new(column: ColumnId, index: usize) -> Self {
        Self { column, index }
    }
}

/// A kanban column: an ordered list of task references plus its count badge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub drag_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    tasks: Vec<TaskId>,
    badge: usize,
}

impl Column {
    pub fn new(id: ColumnId, name: String) -> Self {
        Self {
            id,
            name,
            drag_enabled: false,
            wip_limit: None,
            tasks: Vec::new(),
            badge: 0,
        }
    }

    pub fn draggable(mut self) -> Self {
        self.drag_enabled = true;
        self
    }

    pub fn with_wip_limit(mut self, limit: u32) -> Self {
        self.wip_limit = Some(limit);
        self
    }

    /// Seeds the column with tasks in display order; the badge starts in sync
    pub fn with_tasks<I, T>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self.badge = self.tasks.len();
        self
    }

    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn position_of(&self, task: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t == task)
    }

    /// The count currently displayed on the column's badge
    pub fn badge(&self) -> usize {
        self.badge
    }

    /// Recounts the tasks present and updates the badge
    pub fn refresh_badge(&mut self) -> usize {
        self.badge = self.tasks.len();
        self.badge
    }

    pub fn set_badge(&mut self, count: usize) {
        self.badge = count;
    }

    /// Soft WIP indicator; never blocks a move
    pub fn wip_exceeded(&self) -> bool {
        match self.wip_limit {
            Some(limit) if limit > 0 => self.tasks.len() > limit as usize,
            _ => false,
        }
    }

    fn remove(&mut self, task: &TaskId) -> Option<usize> {
        let index = self.position_of(task)?;
        self.tasks.remove(index);
        Some(index)
    }

    /// Inserts at `index`, appending when the index is past the end.
    /// Returns the index the task actually landed at.
    fn insert(&mut self, index: usize, task: TaskId) -> usize {
        if index <= self.tasks.len() {
            self.tasks.insert(index, task);
            index
        } else {
            self.tasks.push(task);
            self.tasks.len() - 1
        }
    }
}

/// Kanban board state; the single source of truth for task placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(id: BoardId, name: String) -> Self {
        Self {
            id,
            name,
            columns: Vec::new(),
        }
    }

    /// A freshly provisioned task board with the standard workflow columns
    pub fn with_default_columns(id: BoardId, name: String) -> Self {
        let mut board = Self::new(id, name);
        for (column_id, column_name) in [
            ("todo", "To Do"),
            ("doing", "Doing"),
            ("review", "Review"),
            ("done", "Done"),
        ] {
            board = board.with_column(
                Column::new(ColumnId::new(column_id), column_name.to_string()).draggable(),
            );
        }
        board
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| &col.id == id)
    }

    /// Columns that accept drags, in display order
    pub fn drag_enabled_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|col| col.drag_enabled)
    }

    /// Finds the column owning a task and the task's index within it
    pub fn locate(&self, task: &TaskId) -> Option<TaskPosition> {
        self.columns.iter().find_map(|col| {
            col.position_of(task)
                .map(|index| TaskPosition::new(col.id.clone(), index))
        })
    }

    /// Transfers ownership of `task` to column `to` at `index`.
    ///
    /// The task is removed from its current column first, so for moves within a
    /// column `index` refers to the final arrangement. An index past the end of
    /// the destination appends. Badges are not touched.
    pub fn move_task(
        &mut self,
        task: &TaskId,
        to: &ColumnId,
        index: usize,
    ) -> Result<TaskPosition> {
        if self.column(to).is_none() {
            return Err(SyncError::ColumnNotFound(to.to_string()));
        }
        let from = self
            .locate(task)
            .ok_or_else(|| SyncError::TaskNotFound(task.to_string()))?;

        if let Some(column) = self.column_mut(&from.column) {
            column.remove(task);
        }
        let column = self
            .column_mut(to)
            .ok_or_else(|| SyncError::ColumnNotFound(to.to_string()))?;
        let landed = column.insert(index, task.clone());

        Ok(TaskPosition::new(to.clone(), landed))
    }

    /// Recounts a column's tasks into its badge
    pub fn refresh_badge(&mut self, id: &ColumnId) -> Result<usize> {
        self.column_mut(id)
            .map(Column::refresh_badge)
            .ok_or_else(|| SyncError::ColumnNotFound(id.to_string()))
    }

    /// Overwrites a column's badge with an authoritative count
    pub fn set_badge(&mut self, id: &ColumnId, count: usize) -> Result<()> {
        let column = self
            .column_mut(id)
            .ok_or_else(|| SyncError::ColumnNotFound(id.to_string()))?;
        column.set_badge(count);
        Ok(())
    }

    /// Total number of task references on the board
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }
}

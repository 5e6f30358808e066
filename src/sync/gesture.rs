use crate::domain::{BoardId, ColumnId};

/// The drag-gesture capability: makes a column a drag-capable region.
/// Columns bound under the same group exchange tasks freely.
pub trait DragCapability {
    fn bind(&mut self, board: &BoardId, column: &ColumnId, group: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub board: BoardId,
    pub column: ColumnId,
    pub group: String,
}

/// Records bindings; the page script replays them onto its drag library
#[derive(Debug, Default)]
pub struct GestureRegistry {
    bindings: Vec<Binding>,
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_bound(&self, column: &ColumnId) -> bool {
        self.bindings.iter().any(|b| &b.column == column)
    }

    /// Whether a task may be dragged from `from` into `to`
    pub fn shares_group(&self, from: &ColumnId, to: &ColumnId) -> bool {
        let group_of = |column: &ColumnId| {
            self.bindings
                .iter()
                .find(|b| &b.column == column)
                .map(|b| b.group.as_str())
        };
        matches!((group_of(from), group_of(to)), (Some(a), Some(b)) if a == b)
    }
}

impl DragCapability for GestureRegistry {
    fn bind(&mut self, board: &BoardId, column: &ColumnId, group: &str) {
        tracing::debug!(board = %board, column = %column, group, "binding drag region");
        self.bindings.push(Binding {
            board: board.clone(),
            column: column.clone(),
            group: group.to_string(),
        });
    }
}

use crate::{
    client::MoveRequest,
    domain::ColumnId,
    error::{Result, SyncError},
};
use std::fmt;

/// Lifecycle of one drop: `Dropped -> Requesting -> {Committed | RolledBack}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Dropped,
    Requesting,
    Committed,
    RolledBack,
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropped => write!(f, "Dropped"),
            Self::Requesting => write!(f, "Requesting"),
            Self::Committed => write!(f, "Committed"),
            Self::RolledBack => write!(f, "Rolled Back"),
        }
    }
}

impl MoveState {
    pub fn can_transition_to(&self, target: &MoveState) -> bool {
        matches!(
            (self, target),
            (Self::Dropped, Self::Requesting)
                | (Self::Requesting, Self::Committed)
                | (Self::Requesting, Self::RolledBack)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

/// A drop whose request has been built but not yet resolved
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub request: MoveRequest,
    /// Column the task was dragged out of
    pub from: ColumnId,
    state: MoveState,
}

impl PendingMove {
    pub fn new(request: MoveRequest, from: ColumnId) -> Self {
        Self {
            request,
            from,
            state: MoveState::Dropped,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn to(&self) -> &ColumnId {
        &self.request.column_id
    }

    /// Fails with `InvalidMoveTransition` unless `next` is reachable
    pub fn check_transition(&self, next: MoveState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(SyncError::InvalidMoveTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    pub fn transition_to(&mut self, next: MoveState) -> Result<()> {
        self.check_transition(next)?;
        self.state = next;
        Ok(())
    }
}

/// How a move ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Server accepted; badges show these counts
    Committed { from_count: usize, to_count: usize },
    /// Task restored to its origin; `reason` was sent to the notifier
    RolledBack { reason: String },
}

impl MoveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

use crate::{
    domain::{TaskId, TaskPosition},
    error::{Result, SyncError},
};
use chrono::{DateTime, Utc};

/// Snapshot taken when a drag starts; the only input rollback needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub task: TaskId,
    pub origin: TaskPosition,
    pub started_at: DateTime<Utc>,
}

impl DragSession {
    pub fn new(task: TaskId, origin: TaskPosition) -> Self {
        Self {
            task,
            origin,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Idle,
    Dragging(DragSession),
    /// Dropped; the move request has not resolved yet
    Pending(DragSession),
}

/// Holds the board's single drag session.
///
/// A snapshot is never overwritten while its move is pending, so rollback
/// always sees the position captured for that move.
#[derive(Debug, Default)]
pub struct SessionSlot {
    state: SlotState,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SlotState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SlotState::Pending(_))
    }

    pub fn current(&self) -> Option<&DragSession> {
        match &self.state {
            SlotState::Idle => None,
            SlotState::Dragging(session) | SlotState::Pending(session) => Some(session),
        }
    }

    pub fn begin(&mut self, session: DragSession) -> Result<()> {
        match &self.state {
            SlotState::Pending(pending) => {
                return Err(SyncError::MoveInFlight(pending.task.to_string()));
            }
            SlotState::Dragging(previous) => {
                tracing::warn!(
                    previous = %previous.task,
                    task = %session.task,
                    "drag started without a drop for the previous gesture"
                );
            }
            SlotState::Idle => {}
        }
        self.state = SlotState::Dragging(session);
        Ok(())
    }

    /// Moves the active drag of `task` to pending
    pub fn mark_pending(&mut self, task: &TaskId) -> Result<&DragSession> {
        match std::mem::take(&mut self.state) {
            SlotState::Dragging(session) if &session.task == task => {
                self.state = SlotState::Pending(session);
            }
            other => {
                self.state = other;
                return Err(SyncError::NoActiveDrag(task.to_string()));
            }
        }
        self.current()
            .ok_or_else(|| SyncError::NoActiveDrag(task.to_string()))
    }

    /// Releases the pending session once its move resolved
    pub fn finish(&mut self, task: &TaskId) -> Result<DragSession> {
        match std::mem::take(&mut self.state) {
            SlotState::Pending(session) if &session.task == task => Ok(session),
            other => {
                self.state = other;
                Err(SyncError::NoActiveDrag(task.to_string()))
            }
        }
    }

    /// Drops an unresolved gesture; pending moves are kept
    pub fn cancel(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            SlotState::Dragging(session) => Some(session),
            other => {
                self.state = other;
                None
            }
        }
    }
}

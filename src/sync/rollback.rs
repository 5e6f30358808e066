use crate::{
    domain::{Board, TaskPosition},
    error::Result,
    sync::session::DragSession,
};

/// Puts the dragged task back where its session recorded it.
///
/// If siblings shifted and the origin index is now past the end of the origin
/// column, the task is appended there instead. Badges of both the column the
/// task leaves and the origin column are recounted.
pub fn rollback(board: &mut Board, session: &DragSession) -> Result<TaskPosition> {
    let current = board.locate(&session.task);
    let restored = board.move_task(&session.task, &session.origin.column, session.origin.index)?;

    if let Some(current) = current {
        if current.column != restored.column {
            board.refresh_badge(&current.column)?;
        }
    }
    board.refresh_badge(&restored.column)?;

    tracing::debug!(
        task = %session.task,
        column = %restored.column,
        index = restored.index,
        "task restored to origin"
    );
    Ok(restored)
}

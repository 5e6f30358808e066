use crate::{
    client::{AuthToken, MoveClient, MoveEndpoint, MoveRequest, MoveResponse},
    config::SyncConfig,
    domain::{Board, BoardId, ColumnId, Page, TaskId, TaskPosition},
    error::{Result, SyncError},
    notify::{Notification, Notifier},
    projection::BoardProjection,
    sync::{
        gesture::DragCapability,
        rollback::rollback,
        session::{DragSession, SessionSlot},
        state::{MoveOutcome, MoveState, PendingMove},
    },
};

/// What the page provides when it wires up a board
#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub board_id: BoardId,
    pub token: AuthToken,
    /// Move URL with a task-id placeholder, e.g. `/tasks/__TASK_ID__/move/`
    pub endpoint_template: String,
}

/// Drop reported by the drag-gesture library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub task: TaskId,
    pub from: ColumnId,
    pub to: ColumnId,
    pub old_index: usize,
    pub new_index: usize,
}

/// Abandons the pending move unless disarmed once the request resolved
struct AbandonOnDrop<'a, C: MoveClient, N: Notifier> {
    sync: &'a mut BoardSync<C, N>,
    armed: bool,
}

impl<C: MoveClient, N: Notifier> Drop for AbandonOnDrop<'_, C, N> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.sync.abandon_pending() {
            tracing::error!(error = %err, "could not roll back abandoned move");
        }
    }
}

/// Drag-and-drop synchronization for one board.
///
/// Owns the board model and its single drag session. A drop is applied to the
/// model and the badges immediately, then confirmed or reverted when the move
/// request resolves.
pub struct BoardSync<C, N> {
    board: Board,
    endpoint: MoveEndpoint,
    token: AuthToken,
    group: String,
    config: SyncConfig,
    client: C,
    notifier: N,
    slot: SessionSlot,
    requests_sent: usize,
}

impl<C: MoveClient, N: Notifier> BoardSync<C, N> {
    /// Takes the board out of the page and binds its drag-enabled columns.
    ///
    /// Returns `Ok(None)` without touching the page or the gesture capability
    /// when the page has no such board.
    pub fn attach<G: DragCapability>(
        page: &mut Page,
        options: BoardOptions,
        config: SyncConfig,
        gestures: &mut G,
        client: C,
        notifier: N,
    ) -> Result<Option<Self>> {
        if page.board(&options.board_id).is_none() {
            tracing::debug!(board = %options.board_id, "board not on page, skipping");
            return Ok(None);
        }
        let endpoint =
            MoveEndpoint::new(options.endpoint_template, config.task_placeholder.clone())?;
        let board = page
            .take_board(&options.board_id)
            .ok_or_else(|| SyncError::BoardNotFound(options.board_id.to_string()))?;

        let group = config.group_name(board.id.as_str());
        for column in board.drag_enabled_columns() {
            gestures.bind(&board.id, &column.id, &group);
        }

        Ok(Some(Self {
            board,
            endpoint,
            token: options.token,
            group,
            config,
            client,
            notifier,
            slot: SessionSlot::new(),
            requests_sent: 0,
        }))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.slot.current()
    }

    /// True while a move request is outstanding; new drags are refused
    pub fn is_busy(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    pub fn projection(&self) -> BoardProjection {
        BoardProjection::from(&self.board)
    }

    /// Gesture start: snapshot the task's origin for a possible rollback
    pub fn drag_started(&mut self, task: &TaskId, from: &ColumnId, index: usize) -> Result<()> {
        if let Some(pending) = self.slot.current().filter(|_| self.slot.is_pending()) {
            return Err(SyncError::MoveInFlight(pending.task.to_string()));
        }
        let origin = self
            .board
            .locate(task)
            .ok_or_else(|| SyncError::TaskNotFound(task.to_string()))?;
        if !self.is_drag_enabled(&origin.column) {
            return Err(SyncError::ColumnReadOnly(origin.column.to_string()));
        }
        if origin != TaskPosition::new(from.clone(), index) {
            tracing::warn!(
                task = %task,
                reported_column = %from,
                reported_index = index,
                column = %origin.column,
                index = origin.index,
                "gesture origin disagrees with board, using board position"
            );
        }

        self.slot.begin(DragSession::new(task.clone(), origin))
    }

    /// Gesture abandoned without a drop
    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        self.slot.cancel()
    }

    /// Gesture end: apply the drop to the board and recount the affected
    /// badges before anything is sent.
    pub fn drop_task(&mut self, event: &DropEvent) -> Result<PendingMove> {
        let origin = match self.slot.current() {
            Some(session) if session.task == event.task && !self.slot.is_pending() => {
                session.origin.clone()
            }
            _ => return Err(SyncError::NoActiveDrag(event.task.to_string())),
        };
        if event.from != origin.column || event.old_index != origin.index {
            tracing::warn!(
                task = %event.task,
                reported_column = %event.from,
                reported_index = event.old_index,
                column = %origin.column,
                index = origin.index,
                "drop origin disagrees with drag session, rolling back to session origin"
            );
        }

        if self.board.column(&event.to).is_none() {
            self.slot.cancel();
            return Err(SyncError::ColumnNotFound(event.to.to_string()));
        }
        if !self.is_drag_enabled(&event.to) {
            self.slot.cancel();
            return Err(SyncError::ColumnReadOnly(event.to.to_string()));
        }

        let landed = self.board.move_task(&event.task, &event.to, event.new_index)?;
        let from_count = self.board.refresh_badge(&origin.column)?;
        let to_count = if landed.column != origin.column {
            self.board.refresh_badge(&landed.column)?
        } else {
            from_count
        };
        tracing::debug!(
            task = %event.task,
            from = %origin.column,
            to = %landed.column,
            index = landed.index,
            from_count,
            to_count,
            "optimistic move applied"
        );

        self.slot.mark_pending(&event.task)?;
        let request = MoveRequest::new(
            &self.endpoint,
            event.task.clone(),
            landed.column,
            landed.index,
        );
        Ok(PendingMove::new(request, origin.column))
    }

    pub fn begin_request(&mut self, pending: &mut PendingMove) -> Result<()> {
        pending.transition_to(MoveState::Requesting)?;
        self.requests_sent += 1;
        tracing::debug!(
            task = %pending.request.task_id,
            url = %pending.request.url,
            "sending move request"
        );
        Ok(())
    }

    /// Settles a requesting move with the transport's result: commit the
    /// server's counts, or restore the task and notify the user.
    ///
    /// Nothing changes unless `pending` is requesting and still owns the
    /// board's drag session.
    pub fn resolve(
        &mut self,
        pending: &mut PendingMove,
        result: Result<MoveResponse>,
    ) -> Result<MoveOutcome> {
        let result = result.and_then(MoveResponse::into_result);
        let next = if result.is_ok() {
            MoveState::Committed
        } else {
            MoveState::RolledBack
        };
        pending.check_transition(next)?;
        let session = self.slot.finish(&pending.request.task_id)?;
        pending.transition_to(next)?;

        match result {
            Ok(response) => self.commit(pending, &response),
            Err(err) => {
                let (_, reason) = self.restore(&session, &err)?;
                Ok(MoveOutcome::RolledBack { reason })
            }
        }
    }

    /// Rolls back a pending move whose request will never resolve, e.g. when
    /// the caller gave up waiting. Returns the restored position, or `None`
    /// when no move is pending.
    pub fn abandon_pending(&mut self) -> Result<Option<TaskPosition>> {
        let task = match self.slot.current() {
            Some(session) if self.slot.is_pending() => session.task.clone(),
            _ => return Ok(None),
        };
        let session = self.slot.finish(&task)?;
        let err = SyncError::Transport("move request abandoned before it resolved".to_string());
        let (restored, _) = self.restore(&session, &err)?;
        Ok(Some(restored))
    }

    /// Drop, request and resolve in one pass. Failures after the drop are
    /// recovered locally and reported as `MoveOutcome::RolledBack`. If the
    /// returned future is dropped before the request resolves, the move is
    /// abandoned and rolled back.
    pub async fn handle_drop(&mut self, event: DropEvent) -> Result<MoveOutcome> {
        let mut pending = self.drop_task(&event)?;
        self.begin_request(&mut pending)?;

        let mut guard = AbandonOnDrop {
            sync: self,
            armed: true,
        };
        let result = guard
            .sync
            .client
            .send_move(&pending.request, &guard.sync.token)
            .await;
        guard.armed = false;
        guard.sync.resolve(&mut pending, result)
    }

    fn restore(
        &mut self,
        session: &DragSession,
        err: &SyncError,
    ) -> Result<(TaskPosition, String)> {
        let restored = rollback(&mut self.board, session)?;
        let reason = err.user_message(&self.config.generic_error);
        tracing::warn!(
            task = %session.task,
            column = %restored.column,
            index = restored.index,
            error = %err,
            "move rolled back"
        );
        self.notifier
            .notify(Notification::error(reason.clone(), self.config.notification_ttl()));
        Ok((restored, reason))
    }

    fn commit(&mut self, pending: &PendingMove, response: &MoveResponse) -> Result<MoveOutcome> {
        if let Some(count) = response.from_count {
            self.board.set_badge(&pending.from, count)?;
        }
        if let Some(count) = response.to_count {
            self.board.set_badge(pending.to(), count)?;
        }
        let badge = |id: &ColumnId| {
            self.board
                .column(id)
                .map(|c| c.badge())
                .unwrap_or_default()
        };
        let from_count = badge(&pending.from);
        let to_count = badge(pending.to());

        tracing::info!(
            task = %pending.request.task_id,
            from = %pending.from,
            to = %pending.to(),
            from_count,
            to_count,
            "move committed"
        );
        Ok(MoveOutcome::Committed {
            from_count,
            to_count,
        })
    }

    fn is_drag_enabled(&self, column: &ColumnId) -> bool {
        self.board
            .column(column)
            .map(|c| c.drag_enabled)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Column, notify::NotificationCenter, sync::gesture::GestureRegistry};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<MoveResponse>>>,
        sent: Mutex<Vec<(MoveRequest, String)>>,
    }

    impl ScriptedClient {
        fn replying(reply: Result<MoveResponse>) -> Self {
            let client = Self::default();
            client.replies.lock().unwrap().push_back(reply);
            client
        }
    }

    #[async_trait]
    impl MoveClient for ScriptedClient {
        async fn send_move(
            &self,
            request: &MoveRequest,
            token: &AuthToken,
        ) -> Result<MoveResponse> {
            self.sent
                .lock()
                .unwrap()
                .push((request.clone(), token.expose().to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SyncError::Transport("no scripted reply".to_string())))
        }
    }

    fn page() -> Page {
        Page::new().with_board(
            Board::new(BoardId::new("b1"), "Sprint".to_string())
                .with_column(
                    Column::new(ColumnId::new("todo"), "To Do".to_string())
                        .draggable()
                        .with_tasks(["T1", "T2", "T3"]),
                )
                .with_column(
                    Column::new(ColumnId::new("doing"), "Doing".to_string())
                        .draggable()
                        .with_tasks(["T4"]),
                )
                .with_column(
                    Column::new(ColumnId::new("archive"), "Archive".to_string()).with_tasks(["T9"]),
                ),
        )
    }

    fn options() -> BoardOptions {
        BoardOptions {
            board_id: BoardId::new("b1"),
            token: AuthToken::new("csrf"),
            endpoint_template: "/tasks/__TASK_ID__/move/".to_string(),
        }
    }

    type Engine = BoardSync<ScriptedClient, NotificationCenter>;

    fn attach(client: ScriptedClient) -> (Engine, GestureRegistry) {
        let mut page = page();
        let mut gestures = GestureRegistry::new();
        let sync = BoardSync::attach(
            &mut page,
            options(),
            SyncConfig::default(),
            &mut gestures,
            client,
            NotificationCenter::new(),
        )
        .unwrap()
        .unwrap();
        (sync, gestures)
    }

    fn drop_t1_into_doing() -> DropEvent {
        DropEvent {
            task: TaskId::new("T1"),
            from: ColumnId::new("todo"),
            to: ColumnId::new("doing"),
            old_index: 0,
            new_index: 0,
        }
    }

    fn badge(sync: &Engine, column: &str) -> usize {
        sync.board().column(&ColumnId::new(column)).unwrap().badge()
    }

    #[test]
    fn test_attach_binds_only_drag_enabled_columns() {
        let (sync, gestures) = attach(ScriptedClient::default());
        assert_eq!(sync.group(), "board-b1");
        assert_eq!(gestures.bindings().len(), 2);
        assert!(gestures.is_bound(&ColumnId::new("todo")));
        assert!(gestures.is_bound(&ColumnId::new("doing")));
        assert!(!gestures.is_bound(&ColumnId::new("archive")));
        assert!(gestures.shares_group(&ColumnId::new("todo"), &ColumnId::new("doing")));
    }

    #[test]
    fn test_attach_missing_board_is_noop() {
        let mut page = page();
        let mut gestures = GestureRegistry::new();
        let mut opts = options();
        opts.board_id = BoardId::new("nope");

        let sync = BoardSync::attach(
            &mut page,
            opts,
            SyncConfig::default(),
            &mut gestures,
            ScriptedClient::default(),
            NotificationCenter::new(),
        )
        .unwrap();

        assert!(sync.is_none());
        assert!(gestures.bindings().is_empty());
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_attach_rejects_template_without_placeholder() {
        let mut page = page();
        let mut gestures = GestureRegistry::new();
        let mut opts = options();
        opts.endpoint_template = "/tasks/move/".to_string();

        let result = BoardSync::attach(
            &mut page,
            opts,
            SyncConfig::default(),
            &mut gestures,
            ScriptedClient::default(),
            NotificationCenter::new(),
        );
        assert!(matches!(result, Err(SyncError::ConfigError(_))));
        assert!(page.board(&BoardId::new("b1")).is_some());
        assert!(gestures.bindings().is_empty());
    }

    #[test]
    fn test_drop_is_optimistic() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();

        let pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        assert_eq!(pending.state(), MoveState::Dropped);
        assert_eq!(pending.request.url, "/tasks/T1/move/");
        assert_eq!(pending.request.form_body(), "column_id=doing&position=0");
        assert_eq!(badge(&sync, "todo"), 2);
        assert_eq!(badge(&sync, "doing"), 2);
        assert!(sync.is_busy());
        assert_eq!(sync.requests_sent(), 0);
    }

    #[test]
    fn test_drag_refused_while_move_pending() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let _pending = sync.drop_task(&drop_t1_into_doing()).unwrap();

        let err = sync
            .drag_started(&TaskId::new("T2"), &ColumnId::new("todo"), 0)
            .unwrap_err();
        assert!(matches!(err, SyncError::MoveInFlight(_)));
        assert_eq!(sync.session().unwrap().origin, TaskPosition::new(ColumnId::new("todo"), 0));
    }

    #[test]
    fn test_drop_without_drag_is_rejected() {
        let (mut sync, _) = attach(ScriptedClient::default());
        let err = sync.drop_task(&drop_t1_into_doing()).unwrap_err();
        assert!(matches!(err, SyncError::NoActiveDrag(_)));
        assert_eq!(sync.board().column(&ColumnId::new("todo")).unwrap().len(), 3);
    }

    #[test]
    fn test_drop_into_read_only_column_is_rejected() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();

        let mut event = drop_t1_into_doing();
        event.to = ColumnId::new("archive");
        let err = sync.drop_task(&event).unwrap_err();

        assert!(matches!(err, SyncError::ColumnReadOnly(_)));
        assert!(sync.session().is_none());
        assert_eq!(sync.board().column(&ColumnId::new("archive")).unwrap().len(), 1);
    }

    #[test]
    fn test_drag_from_read_only_column_is_rejected() {
        let (mut sync, _) = attach(ScriptedClient::default());
        let err = sync
            .drag_started(&TaskId::new("T9"), &ColumnId::new("archive"), 0)
            .unwrap_err();
        assert!(matches!(err, SyncError::ColumnReadOnly(_)));
    }

    #[test]
    fn test_resolve_requires_requesting_state() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();

        let err = sync
            .resolve(&mut pending, Ok(MoveResponse::success(None, None)))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidMoveTransition { .. }));
    }

    #[test]
    fn test_commit_without_counts_keeps_optimistic_badges() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        sync.begin_request(&mut pending).unwrap();

        let outcome = sync
            .resolve(&mut pending, Ok(MoveResponse::success(None, None)))
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Committed { from_count: 2, to_count: 2 });
        assert_eq!(pending.state(), MoveState::Committed);
        assert!(!sync.is_busy());
    }

    #[test]
    fn test_server_counts_override_client_counts() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        sync.begin_request(&mut pending).unwrap();

        sync.resolve(&mut pending, Ok(MoveResponse::success(Some(5), None)))
            .unwrap();
        assert_eq!(badge(&sync, "todo"), 5);
        assert_eq!(badge(&sync, "doing"), 2);
    }

    #[test]
    fn test_malformed_response_rolls_back_with_generic_message() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        sync.begin_request(&mut pending).unwrap();

        let outcome = sync
            .resolve(
                &mut pending,
                Err(SyncError::MalformedResponse("expected value".to_string())),
            )
            .unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::RolledBack {
                reason: SyncConfig::default().generic_error
            }
        );
        assert_eq!(
            sync.board().locate(&TaskId::new("T1")),
            Some(TaskPosition::new(ColumnId::new("todo"), 0))
        );
        assert_eq!(sync.notifier().active().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_drop_sends_token_once() {
        let client = ScriptedClient::replying(Ok(MoveResponse::success(Some(2), Some(2))));
        let (mut sync, _) = attach(client);
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();

        let outcome = sync.handle_drop(drop_t1_into_doing()).await.unwrap();
        assert!(outcome.is_committed());
        assert_eq!(sync.requests_sent(), 1);

        let sent = sync.client().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "csrf");
        assert_eq!(sent[0].0.column_id, ColumnId::new("doing"));
    }

    #[test]
    fn test_abandon_pending_rolls_back_and_frees_slot() {
        let (mut sync, _) = attach(ScriptedClient::default());
        assert_eq!(sync.abandon_pending().unwrap(), None);

        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        sync.begin_request(&mut pending).unwrap();

        let restored = sync.abandon_pending().unwrap();
        assert_eq!(restored, Some(TaskPosition::new(ColumnId::new("todo"), 0)));
        assert!(!sync.is_busy());
        assert_eq!(badge(&sync, "todo"), 3);
        assert_eq!(badge(&sync, "doing"), 1);
        assert_eq!(
            sync.notifier().active()[0].message,
            SyncConfig::default().generic_error
        );
    }

    #[test]
    fn test_resolve_after_abandon_leaves_move_requesting() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T1"), &ColumnId::new("todo"), 0).unwrap();
        let mut pending = sync.drop_task(&drop_t1_into_doing()).unwrap();
        sync.begin_request(&mut pending).unwrap();
        sync.abandon_pending().unwrap();

        let err = sync
            .resolve(&mut pending, Ok(MoveResponse::success(Some(2), Some(2))))
            .unwrap_err();
        assert!(matches!(err, SyncError::NoActiveDrag(_)));
        assert_eq!(pending.state(), MoveState::Requesting);
        assert_eq!(badge(&sync, "todo"), 3);
    }

    #[test]
    fn test_cancel_drag_clears_session() {
        let (mut sync, _) = attach(ScriptedClient::default());
        sync.drag_started(&TaskId::new("T2"), &ColumnId::new("todo"), 1).unwrap();
        assert!(sync.cancel_drag().is_some());
        assert!(sync.session().is_none());
    }
}

//! # Taskboard Sync
//!
//! Drag-and-drop synchronization for server-rendered kanban boards.
//!
//! A drop is applied to the in-memory board at once (task order and column
//! count badges), confirmed by a single move request to the server, and rolled
//! back to the position captured at drag start if that request fails. The page
//! renders the board from [`projection::BoardProjection`].

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod projection;
pub mod sync;

// Re-export commonly used types
pub use client::{AuthToken, HttpMoveClient, MoveClient, MoveEndpoint, MoveRequest, MoveResponse};
pub use config::SyncConfig;
pub use domain::{Board, BoardId, Column, ColumnId, Page, TaskId, TaskPosition};
pub use error::{Result, SyncError};
pub use notify::{Notification, NotificationCenter, Notifier};
pub use sync::{BoardOptions, BoardSync, DropEvent, GestureRegistry, MoveOutcome, MoveState};

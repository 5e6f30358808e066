//! Transient, dismissible messages handed to the surrounding page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub dismiss_after: Duration,
}

impl Notification {
    pub fn error(message: impl Into<String>, dismiss_after: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: NotificationLevel::Error,
            message: message.into(),
            created_at: Utc::now(),
            dismiss_after,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.dismiss_after) {
            Ok(ttl) => now >= self.created_at + ttl,
            Err(_) => false,
        }
    }
}

/// Sink for user-visible notifications
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// In-memory notification channel; the page drains or renders `active()`
#[derive(Debug, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Removes notifications whose display interval has elapsed
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired(now));
        before - self.notifications.len()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

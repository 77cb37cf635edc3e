//! Transient notifications (toasts) raised by the controllers.

use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip)]
    pub expires_at: Instant,
}

/// Live notifications, oldest first. Expired entries are pruned on `expire`.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.items.push(Notification {
            kind,
            message: message.into(),
            expires_at: now + self.ttl,
        });
    }

    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }
}

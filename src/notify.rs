//! Transient user notifications ("toasts").

use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::shared::Shared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// Monotonic per notifier, starting at 1.
    pub id: u64,
    pub title: String,
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

#[derive(Debug, Default)]
struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Fire-and-forget notification sink shared by every controller.
///
/// Emitting never fails and never blocks; toasts disappear on their own once
/// they are older than the configured time-to-live.
#[derive(Debug, Clone)]
pub struct ToastNotifier {
    queue: Shared<ToastQueue>,
    ttl: Duration,
}

impl ToastNotifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Shared::default(),
            ttl,
        }
    }

    pub fn success(&self, title: &str, message: impl Into<String>) {
        self.push(title, message.into(), ToastLevel::Success);
    }

    pub fn error(&self, title: &str, message: impl Into<String>) {
        self.push(title, message.into(), ToastLevel::Error);
    }

    fn push(&self, title: &str, message: String, level: ToastLevel) {
        match level {
            ToastLevel::Success => info!(title, message = %message, "toast"),
            ToastLevel::Error => warn!(title, message = %message, "toast"),
        }
        let now = Instant::now();
        self.queue.with(|queue| {
            queue.next_id += 1;
            let id = queue.next_id;
            queue.toasts.push(Toast {
                id,
                title: title.to_string(),
                message,
                level,
                shown_at: now,
            });
        });
    }

    /// Toasts still on screen at `now`, oldest first. Expired ones are
    /// dropped as a side effect.
    pub fn visible(&self, now: Instant) -> Vec<Toast> {
        let ttl = self.ttl;
        self.queue.with(|queue| {
            queue
                .toasts
                .retain(|toast| now.saturating_duration_since(toast.shown_at) < ttl);
            queue.toasts.clone()
        })
    }

    /// Visible toasts newer than `last_seen`.
    pub fn since(&self, last_seen: u64, now: Instant) -> Vec<Toast> {
        self.visible(now)
            .into_iter()
            .filter(|toast| toast.id > last_seen)
            .collect()
    }

    /// Most recent toast regardless of expiry.
    pub fn last(&self) -> Option<Toast> {
        self.queue.with(|queue| queue.toasts.last().cloned())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{Notification, Severity};

/// The one transient notification currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub notification_id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

impl From<&Notification> for Toast {
    fn from(n: &Notification) -> Self {
        Self {
            notification_id: n.id,
            title: n.title.clone(),
            message: n.message.clone(),
            severity: n.severity,
            shown_at: Utc::now(),
        }
    }
}

/// Holds the active toast and its dismiss timer. Every `show` bumps the
/// generation, so a timer armed for an older toast can never dismiss a newer one.
#[derive(Debug, Default)]
pub(crate) struct ToastSlot {
    current: Option<Toast>,
    generation: u64,
    dismiss_timer: Option<JoinHandle<()>>,
}

impl ToastSlot {
    /// Replaces the active toast and cancels the pending dismiss timer.
    /// Returns the generation the new timer must present to `expire`.
    pub(crate) fn show(&mut self, toast: Toast) -> u64 {
        self.cancel_timer();
        self.generation += 1;
        self.current = Some(toast);
        self.generation
    }

    pub(crate) fn arm(&mut self, timer: JoinHandle<()>) {
        self.cancel_timer();
        self.dismiss_timer = Some(timer);
    }

    /// Timer callback: clears the toast only if it is still the one the
    /// timer was armed for.
    pub(crate) fn expire(&mut self, generation: u64) -> Option<Toast> {
        if generation != self.generation {
            return None;
        }
        self.dismiss_timer = None;
        self.current.take()
    }

    pub(crate) fn dismiss(&mut self) -> Option<Toast> {
        self.cancel_timer();
        self.current.take()
    }

    pub(crate) fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.dismiss_timer.take() {
            timer.abort();
        }
    }
}

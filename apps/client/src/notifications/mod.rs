//! Notification Center: the user-facing event log, the single active toast,
//! and the notification panel's auto-read behaviour.
//!
//! The center is an explicitly constructed handle passed to every component
//! that raises notifications. Renderers observe it through `subscribe()`;
//! components without a handle send requests through a `Notifier`.

pub mod center;
pub mod store;
pub mod toast;

pub use center::{NotificationCenter, Notifier, NotifyRequest};
pub use store::{JsonFileStore, MemoryStore, NotificationStore};
pub use toast::Toast;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_NOTIFICATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// One entry of the notification log. `read` only ever goes false → true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// UUIDv7, so ids sort by creation time.
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
            read: false,
        }
    }
}

/// Change feed for renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum CenterEvent {
    Added(Notification),
    Read(Vec<Uuid>),
    Removed(Uuid),
    Cleared,
    ToastShown(Toast),
    ToastDismissed(Uuid),
}

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// Oldest entries are evicted beyond this many.
    pub max_notifications: usize,
    pub toast_duration: Duration,
    /// Delay after opening the panel before unread entries are marked read.
    pub auto_read_delay: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            toast_duration: Duration::from_secs(5),
            auto_read_delay: Duration::from_secs(2),
        }
    }
}

//! User-facing notifications
//!
//! The store only emits success notifications, and only when the caller asks
//! for them. How they are shown is up to the sink.

use std::time::Duration;

use tracing::{info, warn};

/// How long a notification stays visible unless configured otherwise
pub const DEFAULT_NOTIFY_DURATION: Duration = Duration::from_millis(1500);

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Success,
    Info,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    /// Auto-dismiss delay
    pub duration: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            duration: DEFAULT_NOTIFY_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Receives notifications; fire-and-forget
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => warn!("{}", notification.message),
            NotificationKind::Success | NotificationKind::Info => {
                info!("{}", notification.message)
            }
        }
    }
}

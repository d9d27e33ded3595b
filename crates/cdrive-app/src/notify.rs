//! User-facing notifications emitted by the orchestrators.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Failure,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

/// Receives notifications for display.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            NotificationLevel::Failure => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}

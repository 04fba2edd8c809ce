use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Error,
    /// Blocks input until acknowledged; never auto-dismissed.
    Alert,
}

impl NotificationType {
    fn timeout(&self) -> Option<Duration> {
        match self {
            NotificationType::Info => Some(Duration::from_secs(3)),
            NotificationType::Error => Some(Duration::from_secs(8)),
            NotificationType::Alert => None,
        }
    }
}

/// Message shown on top of the current view.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: Instant,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error)
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Alert)
    }

    fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.notification_type == NotificationType::Alert
    }

    pub fn should_dismiss(&self) -> bool {
        self.notification_type
            .timeout()
            .is_some_and(|timeout| self.created_at.elapsed() > timeout)
    }
}

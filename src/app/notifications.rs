use std::time::{Duration, Instant};

const NOTIFICATION_TTL: Duration = Duration::from_secs(6);
const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
            NotificationKind::Info => Color::Cyan,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= NOTIFICATION_TTL
    }
}

/// Newest-last queue of user-facing notifications
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notification: Notification) {
        tracing::info!(kind = ?notification.kind, message = %notification.message, "notify");
        self.items.push(notification);
        if self.items.len() > MAX_NOTIFICATIONS {
            self.items.remove(0);
        }
    }

    /// Most recent notification that has not expired
    pub fn current(&self) -> Option<&Notification> {
        self.items.last().filter(|n| !n.is_expired())
    }

    pub fn prune(&mut self) {
        self.items.retain(|n| !n.is_expired());
    }

    #[cfg(test)]
    pub fn all(&self) -> &[Notification] {
        &self.items
    }
}

// Copy

pub fn kapacitor_success() -> Notification {
    Notification::new(
        NotificationKind::Success,
        "Kapacitor Created! Configuring endpoints is optional.",
    )
}

pub fn kapacitor_updated() -> Notification {
    Notification::new(
        NotificationKind::Success,
        "Connected to Kapacitor and updated successfully.",
    )
}

pub fn could_not_connect_to_kapacitor(name: &str) -> Notification {
    Notification::new(
        NotificationKind::Error,
        format!(
            "Could not connect to Kapacitor {}. Check your connection settings.",
            name
        ),
    )
}

pub fn could_not_connect_to_updated_kapacitor(name: &str) -> Notification {
    Notification::new(
        NotificationKind::Error,
        format!(
            "Updated Kapacitor {}, but could not connect to it. Check your connection settings.",
            name
        ),
    )
}

pub fn kapacitor_deleted(name: &str) -> Notification {
    Notification::new(NotificationKind::Success, format!("{} was deleted.", name))
}

pub fn kapacitor_activated(name: &str) -> Notification {
    Notification::new(
        NotificationKind::Info,
        format!("{} is now the active Kapacitor.", name),
    )
}

pub fn rule_deleted(name: &str) -> Notification {
    Notification::new(
        NotificationKind::Success,
        format!("{} deleted successfully.", name),
    )
}

pub fn rule_not_deleted(name: &str) -> Notification {
    Notification::new(
        NotificationKind::Error,
        format!("{} could not be deleted.", name),
    )
}

pub fn rule_status_updated(name: &str, status: &str) -> Notification {
    Notification::new(
        NotificationKind::Success,
        format!("{} {} successfully.", name, status),
    )
}

pub fn rule_status_not_updated(name: &str, status: &str) -> Notification {
    Notification::new(
        NotificationKind::Error,
        format!("{} could not be {}.", name, status),
    )
}

pub fn load_failed(what: &str, error: &anyhow::Error) -> Notification {
    Notification::new(
        NotificationKind::Error,
        format!("Failed to load {}: {}", what, error),
    )
}

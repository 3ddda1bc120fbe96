//! Transient user notifications
//!
//! Every non-fatal failure (stock rejections, API errors) and a few successes
//! are surfaced to the UI as dismissible notifications. The UI either polls
//! [`NotificationCenter::active`] or subscribes to the broadcast stream.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the live notification stream. Slow subscribers lag rather
/// than block the cart.
const STREAM_CAPACITY: usize = 64;

/// Seconds a notification stays visible unless dismissed first.
pub const DEFAULT_NOTIFICATION_TTL_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }
}

/// Sink for user notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// In-process notification hub holding the currently visible notifications.
///
/// Notifications older than the TTL are pruned on every read and write.
pub struct NotificationCenter {
    active: DashMap<Uuid, Notification>,
    stream: broadcast::Sender<Notification>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_NOTIFICATION_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (stream, _) = broadcast::channel(STREAM_CAPACITY);
        Self {
            active: DashMap::new(),
            stream,
            ttl,
        }
    }

    /// Currently visible notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.prune_expired();
        let mut items: Vec<Notification> =
            self.active.iter().map(|entry| entry.value().clone()).collect();
        items.sort_by_key(|n| n.created_at);
        items
    }

    /// Dismisses a notification. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.active.remove(&id).is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.stream.subscribe()
    }

    fn prune_expired(&self) {
        let cutoff = Utc::now() - self.ttl;
        self.active
            .retain(|_, notification| notification.created_at > cutoff);
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::error!(id = %notification.id, "{}", notification.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(id = %notification.id, "{}", notification.message)
            }
            _ => tracing::info!(id = %notification.id, "{}", notification.message),
        }

        self.prune_expired();
        self.active.insert(notification.id, notification.clone());
        // No subscribers is fine; the notification stays in `active`.
        let _ = self.stream.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_and_dismiss() {
        let center = NotificationCenter::new();
        let warning = Notification::warning("Only 5 left in stock");
        let id = warning.id;

        center.notify(warning);
        center.notify(Notification::success("Order placed"));

        let active = center.active();
        assert_eq!(active.len(), 2);
        assert!(active.iter().any(|n| n.message == "Only 5 left in stock"));

        assert!(center.dismiss(id));
        assert!(!center.dismiss(id), "second dismiss is a no-op");
        assert_eq!(center.active().len(), 1);
    }

    #[test]
    fn test_expired_notifications_are_pruned() {
        let center = NotificationCenter::with_ttl(Duration::seconds(30));
        let mut stale = Notification::warning("Only 5 left in stock");
        stale.created_at = Utc::now() - Duration::seconds(60);
        let stale_id = stale.id;

        center.notify(stale);
        assert!(center.active().is_empty());
        assert!(!center.dismiss(stale_id), "already pruned");

        let mut old = Notification::error("Network unavailable");
        old.created_at = Utc::now() - Duration::seconds(45);
        center.active.insert(old.id, old);
        center.notify(Notification::success("Order placed"));

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Order placed");
        assert_eq!(center.active.len(), 1, "notify prunes stale entries too");
    }

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        center.notify(Notification::error("Network unavailable"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Error);
        assert_eq!(received.message, "Network unavailable");
    }
}

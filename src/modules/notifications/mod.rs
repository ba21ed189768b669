//! Outbound notification dispatch.
//!
//! The scheduler fires notifications and moves on; delivery is a collaborator
//! concern. Failures are logged, never propagated.

use async_trait::async_trait;
use serde::Serialize;

/// Topic for booking confirmations
pub const TOPIC_NOTIFICATIONS: &str = "notifications/send";

/// Topic for edit request decisions
pub const TOPIC_EDIT_REQUEST: &str = "appointments/edit-request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Email,
    EditRequestApproved,
    EditRequestRejected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: i64,
    /// Absent when the caller does not know the address; the sink resolves it
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub topic: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Fire-and-forget delivery. Implementations log failures themselves.
    async fn send(&self, notification: Notification);
}

/// Sink that only records the notification in the log stream.
///
/// Stands in for the production email/MQTT publisher in local setups and
/// tests.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, notification: Notification) {
        tracing::info!(
            user_id = notification.user_id,
            kind = ?notification.kind,
            topic = %notification.topic,
            subject = %notification.subject,
            "dispatching notification: {}",
            notification.message
        );
    }
}

//! NotificationDispatcher port - Real-time delivery of notifications.
//!
//! The rest of the application calls this port to push a notification (or a
//! change to one) to every live client of its owner. Delivery is best-effort
//! per connection: a missing or overloaded client is not an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::foundation::{NotificationId, Timestamp, UserId};
use crate::domain::notification::{
    Notification, NotificationCreated, NotificationStatus, NotificationType,
};

/// Wire snapshot of a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<Timestamp>,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            notification_id: *notification.id(),
            user_id: notification.user_id().clone(),
            title: notification.title().to_string(),
            message: notification.message().to_string(),
            notification_type: notification.notification_type(),
            status: notification.status(),
            data: notification.data().cloned(),
            created_at: *notification.created_at(),
            read_at: notification.read_at().copied(),
        }
    }
}

impl From<NotificationCreated> for NotificationView {
    fn from(event: NotificationCreated) -> Self {
        Self {
            notification_id: event.notification_id,
            user_id: event.user_id,
            title: event.title,
            message: event.message,
            notification_type: event.notification_type,
            status: NotificationStatus::Unread,
            data: event.data,
            created_at: event.created_at,
            read_at: None,
        }
    }
}

/// Kind of state change carried by a `NotificationUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Read,
    Unread,
    Archived,
}

/// Partial update to a notification the client already holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationUpdate {
    pub notification_id: NotificationId,
    pub update_type: UpdateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl NotificationUpdate {
    pub fn new(notification_id: NotificationId, update_type: UpdateType) -> Self {
        Self {
            notification_id,
            update_type,
            data: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// Result of a fan-out to one user's live connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Connections whose mailbox accepted the payload.
    pub delivered: usize,
    /// Connections removed because their mailbox was full or already closed.
    pub evicted: usize,
}

impl DeliveryOutcome {
    /// True when the user had no live connection to deliver to.
    pub fn is_noop(&self) -> bool {
        self.delivered == 0 && self.evicted == 0
    }
}

/// Errors reported to the dispatcher's caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to serialize notification payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for pushing notifications to a user's live clients.
///
/// Both operations serialize first and fail only if serialization fails;
/// per-connection delivery failures show up in the returned `DeliveryOutcome`.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver a newly created notification.
    async fn send_notification(
        &self,
        user_id: &UserId,
        notification: &NotificationView,
    ) -> Result<DeliveryOutcome, DispatchError>;

    /// Deliver a state change (read, unread, archived).
    async fn send_update(
        &self,
        user_id: &UserId,
        update: &NotificationUpdate,
    ) -> Result<DeliveryOutcome, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EventId;
    use serde_json::json;

    #[test]
    fn view_serializes_type_field_on_the_wire() {
        let event = NotificationCreated {
            event_id: EventId::new(),
            notification_id: NotificationId::new(),
            user_id: UserId::new("user-1").unwrap(),
            title: "Rent due".to_string(),
            message: "Rent is due in 3 days.".to_string(),
            notification_type: NotificationType::BillReminder,
            data: None,
            created_at: Timestamp::now(),
        };

        let value = serde_json::to_value(NotificationView::from(event)).unwrap();

        assert_eq!(value["type"], "bill_reminder");
        assert_eq!(value["status"], "unread");
        assert_eq!(value["user_id"], "user-1");
        assert!(value.get("data").is_none());
        assert!(value.get("read_at").is_none());
    }

    #[test]
    fn update_serializes_snake_case_kind() {
        let update = NotificationUpdate::new(NotificationId::new(), UpdateType::Archived)
            .with_data(json!({"status": "archived"}));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["update_type"], "archived");
        assert_eq!(value["data"]["status"], "archived");
    }

    #[test]
    fn default_outcome_is_noop() {
        assert!(DeliveryOutcome::default().is_noop());
        assert!(!DeliveryOutcome { delivered: 1, evicted: 0 }.is_noop());
    }

    #[test]
    fn dispatcher_is_object_safe() {
        fn _accepts_dyn(_dispatcher: &dyn NotificationDispatcher) {}
    }
}

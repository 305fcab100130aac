//! WebSocket implementation of the `NotificationDispatcher` port.
//!
//! Serializes each message once and hands the shared payload to the
//! registry for fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::foundation::UserId;
use crate::ports::{
    DeliveryOutcome, DispatchError, NotificationDispatcher, NotificationUpdate, NotificationView,
};

use super::messages::{NotificationMessage, ServerMessage};
use super::registry::ConnectionRegistry;

/// Pushes notifications to a user's live WebSocket connections.
#[derive(Debug, Clone)]
pub struct WebSocketNotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl WebSocketNotificationDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    async fn deliver(
        &self,
        user_id: &UserId,
        message: &ServerMessage,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let payload = message.to_payload()?;
        let outcome = self.registry.send_to_user(user_id, &payload).await;
        debug!(
            user_id = %user_id,
            delivered = outcome.delivered,
            evicted = outcome.evicted,
            "Dispatched realtime message"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl NotificationDispatcher for WebSocketNotificationDispatcher {
    async fn send_notification(
        &self,
        user_id: &UserId,
        notification: &NotificationView,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let message = ServerMessage::Notification(NotificationMessage {
            data: notification.clone(),
        });
        self.deliver(user_id, &message).await
    }

    async fn send_update(
        &self,
        user_id: &UserId,
        update: &NotificationUpdate,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let message = ServerMessage::NotificationUpdate(update.clone());
        self.deliver(user_id, &message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::connection::ConnectionHandle;
    use crate::domain::foundation::{NotificationId, Timestamp};
    use crate::domain::notification::{NotificationStatus, NotificationType};
    use crate::ports::UpdateType;
    use serde_json::Value;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn view(owner: &str) -> NotificationView {
        NotificationView {
            notification_id: NotificationId::new(),
            user_id: user(owner),
            title: "Savings goal reached".to_string(),
            message: "Emergency fund is at 100%.".to_string(),
            notification_type: NotificationType::GoalMilestone,
            status: NotificationStatus::Unread,
            data: None,
            created_at: Timestamp::now(),
            read_at: None,
        }
    }

    #[tokio::test]
    async fn notification_is_wrapped_in_envelope() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (handle, mut mailbox) = ConnectionHandle::new(user("u1"), 4);
        registry.register(handle).await;
        let dispatcher = WebSocketNotificationDispatcher::new(registry);

        let notification = view("u1");
        let outcome = dispatcher
            .send_notification(&user("u1"), &notification)
            .await
            .unwrap();

        assert_eq!(outcome.delivered, 1);
        let frame: Value = serde_json::from_str(mailbox.try_recv().unwrap().as_str()).unwrap();
        assert_eq!(frame["type"], "notification");
        assert_eq!(
            frame["data"]["notification_id"],
            notification.notification_id.to_string()
        );
        assert_eq!(frame["data"]["type"], "goal_milestone");
    }

    #[tokio::test]
    async fn update_is_sent_as_notification_update() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (handle, mut mailbox) = ConnectionHandle::new(user("u1"), 4);
        registry.register(handle).await;
        let dispatcher = WebSocketNotificationDispatcher::new(registry);

        let update = NotificationUpdate::new(NotificationId::new(), UpdateType::Unread);
        dispatcher.send_update(&user("u1"), &update).await.unwrap();

        let frame: Value = serde_json::from_str(mailbox.try_recv().unwrap().as_str()).unwrap();
        assert_eq!(frame["type"], "notification_update");
        assert_eq!(frame["update_type"], "unread");
    }

    #[tokio::test]
    async fn offline_user_is_not_an_error() {
        let dispatcher = WebSocketNotificationDispatcher::new(Arc::new(ConnectionRegistry::new()));

        let outcome = dispatcher
            .send_notification(&user("offline"), &view("offline"))
            .await
            .unwrap();

        assert!(outcome.is_noop());
    }
}

//! CreateNotificationHandler - Command handler for raising a notification.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::foundation::{
    CommandMetadata, DomainError, EventId, NotificationId, SerializableDomainEvent, UserId,
};
use crate::domain::notification::{
    Notification, NotificationCreated, NotificationError, NotificationType,
};
use crate::ports::{EventPublisher, NotificationRepository};

/// Command to create a notification for a user.
#[derive(Debug, Clone)]
pub struct CreateNotificationCommand {
    pub user_id: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: Option<JsonValue>,
}

/// Result of successful notification creation.
#[derive(Debug, Clone)]
pub struct CreateNotificationResult {
    pub notification: Notification,
    pub event: NotificationCreated,
}

/// Handler for creating notifications.
pub struct CreateNotificationHandler {
    repository: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateNotificationHandler {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateNotificationCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateNotificationResult, NotificationError> {
        // 1. Build aggregate (validates title and message)
        let notification = Notification::new(
            NotificationId::new(),
            cmd.user_id,
            cmd.notification_type,
            cmd.title,
            cmd.message,
            cmd.data,
        )?;

        // 2. Persist
        self.repository.save(&notification).await?;

        // 3. Publish event
        let event = NotificationCreated {
            event_id: EventId::new(),
            notification_id: *notification.id(),
            user_id: notification.user_id().clone(),
            title: notification.title().to_string(),
            message: notification.message().to_string(),
            notification_type: notification.notification_type(),
            data: notification.data().cloned(),
            created_at: *notification.created_at(),
        };

        let envelope = metadata.stamp(event.to_envelope().map_err(DomainError::from)?);
        self.event_publisher.publish(envelope).await?;

        tracing::debug!(
            notification_id = %notification.id(),
            user_id = %notification.user_id(),
            notification_type = %notification.notification_type(),
            "Notification created"
        );

        Ok(CreateNotificationResult {
            notification,
            event,
        })
    }
}

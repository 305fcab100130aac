//! ChangeNotificationStatusHandler - Mark read, mark unread, or archive.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, DomainError, EventEnvelope, EventId, NotificationId,
    SerializableDomainEvent, UserId,
};
use crate::domain::notification::{
    Notification, NotificationArchived, NotificationError, NotificationRead, NotificationUnread,
};
use crate::ports::{EventPublisher, NotificationRepository};

/// Requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    MarkRead,
    MarkUnread,
    Archive,
}

/// Command to change a notification's status.
#[derive(Debug, Clone)]
pub struct ChangeNotificationStatusCommand {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub change: StatusChange,
}

/// Result of a successful status change.
#[derive(Debug, Clone)]
pub struct ChangeNotificationStatusResult {
    pub notification: Notification,
    /// The published event (read, unread or archived).
    pub event: EventEnvelope,
}

/// Handler for notification status changes.
pub struct ChangeNotificationStatusHandler {
    repository: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ChangeNotificationStatusHandler {
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
        cmd: ChangeNotificationStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<ChangeNotificationStatusResult, NotificationError> {
        // 1. Load notification
        let mut notification = self
            .repository
            .find_by_id(&cmd.notification_id)
            .await?
            .ok_or_else(|| NotificationError::not_found(cmd.notification_id))?;

        // 2. Authorize - user must be owner
        notification.authorize(&cmd.user_id)?;

        // 3. Apply change and build its event
        let event = match cmd.change {
            StatusChange::MarkRead => NotificationRead {
                event_id: EventId::new(),
                notification_id: cmd.notification_id,
                user_id: cmd.user_id,
                read_at: notification.mark_read()?,
            }
            .to_envelope(),
            StatusChange::MarkUnread => NotificationUnread {
                event_id: EventId::new(),
                notification_id: cmd.notification_id,
                user_id: cmd.user_id,
                marked_unread_at: notification.mark_unread()?,
            }
            .to_envelope(),
            StatusChange::Archive => NotificationArchived {
                event_id: EventId::new(),
                notification_id: cmd.notification_id,
                user_id: cmd.user_id,
                archived_at: notification.archive()?,
            }
            .to_envelope(),
        }
        .map_err(DomainError::from)?;

        // 4. Persist
        self.repository.update(&notification).await?;

        // 5. Publish event
        let event = metadata.stamp(event);
        self.event_publisher.publish(event.clone()).await?;

        Ok(ChangeNotificationStatusResult {
            notification,
            event,
        })
    }
}

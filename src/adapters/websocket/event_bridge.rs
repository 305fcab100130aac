//! Event bridge connecting notification events to live clients.
//!
//! # Event Flow
//!
//! ```text
//! notification.*.v1 published
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │ NotificationEventBridge  │
//! │  decode → NotificationEvent
//! └──────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │ NotificationDispatcher   │
//! │  send to the owner       │
//! └──────────────────────────┘
//! ```
//!
//! A malformed event is logged and skipped; it never fails the publisher or
//! blocks later events.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{trace, warn};

use crate::domain::foundation::{DomainError, EventEnvelope, UserId};
use crate::domain::notification::{
    NotificationArchived, NotificationCreated, NotificationRead, NotificationUnread,
    NOTIFICATION_ARCHIVED, NOTIFICATION_CREATED, NOTIFICATION_READ, NOTIFICATION_UNREAD,
};
use crate::ports::{
    EventHandler, EventSubscriber, NotificationDispatcher, NotificationUpdate, NotificationView,
    UpdateType,
};

/// Event types delivered to live clients.
pub const NOTIFICATION_EVENT_TYPES: &[&str] = &[
    NOTIFICATION_CREATED,
    NOTIFICATION_READ,
    NOTIFICATION_UNREAD,
    NOTIFICATION_ARCHIVED,
];

/// Notification events the bridge understands, decoded from an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Created(NotificationCreated),
    Read(NotificationRead),
    Unread(NotificationUnread),
    Archived(NotificationArchived),
}

impl NotificationEvent {
    /// Decodes an envelope.
    ///
    /// Returns `Ok(None)` for event types the bridge does not handle and an
    /// error when a handled type carries a payload of the wrong shape.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Option<Self>, serde_json::Error> {
        let event = match envelope.event_type.as_str() {
            NOTIFICATION_CREATED => NotificationEvent::Created(envelope.payload_as()?),
            NOTIFICATION_READ => NotificationEvent::Read(envelope.payload_as()?),
            NOTIFICATION_UNREAD => NotificationEvent::Unread(envelope.payload_as()?),
            NOTIFICATION_ARCHIVED => NotificationEvent::Archived(envelope.payload_as()?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// The user whose clients should hear about this event.
    pub fn user_id(&self) -> &UserId {
        match self {
            NotificationEvent::Created(e) => &e.user_id,
            NotificationEvent::Read(e) => &e.user_id,
            NotificationEvent::Unread(e) => &e.user_id,
            NotificationEvent::Archived(e) => &e.user_id,
        }
    }
}

/// Bridge between the event bus and the notification dispatcher.
pub struct NotificationEventBridge {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationEventBridge {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn new_shared(dispatcher: Arc<dyn NotificationDispatcher>) -> Arc<Self> {
        Arc::new(Self::new(dispatcher))
    }

    /// Subscribes this bridge to every notification event type.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let bridge = NotificationEventBridge::new_shared(dispatcher);
    /// bridge.register(&event_bus);
    /// ```
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(NOTIFICATION_EVENT_TYPES, self.clone());
    }

    async fn deliver(&self, event: NotificationEvent) -> Result<(), crate::ports::DispatchError> {
        let user_id = event.user_id().clone();
        match event {
            NotificationEvent::Created(created) => {
                let view = NotificationView::from(created);
                self.dispatcher.send_notification(&user_id, &view).await?;
            }
            NotificationEvent::Read(read) => {
                let update = NotificationUpdate::new(read.notification_id, UpdateType::Read)
                    .with_data(json!({ "status": "read", "read_at": read.read_at }));
                self.dispatcher.send_update(&user_id, &update).await?;
            }
            NotificationEvent::Unread(unread) => {
                let update = NotificationUpdate::new(unread.notification_id, UpdateType::Unread)
                    .with_data(json!({ "status": "unread" }));
                self.dispatcher.send_update(&user_id, &update).await?;
            }
            NotificationEvent::Archived(archived) => {
                let update =
                    NotificationUpdate::new(archived.notification_id, UpdateType::Archived)
                        .with_data(json!({ "status": "archived", "archived_at": archived.archived_at }));
                self.dispatcher.send_update(&user_id, &update).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for NotificationEventBridge {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let decoded = match NotificationEvent::from_envelope(&event) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                trace!(event_type = %event.event_type, "Ignoring non-notification event");
                return Ok(());
            }
            Err(e) => {
                warn!(
                    event_type = %event.event_type,
                    event_id = %event.event_id,
                    error = %e,
                    "Skipping malformed notification event"
                );
                return Ok(());
            }
        };

        if let Err(e) = self.deliver(decoded).await {
            warn!(
                event_type = %event.event_type,
                event_id = %event.event_id,
                error = %e,
                "Failed to dispatch notification event"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotificationEventBridge"
    }
}

//! Notification domain events.
//!
//! - `NotificationCreated` - New notification for a user
//! - `NotificationRead` - Marked as read
//! - `NotificationUnread` - Marked as unread again
//! - `NotificationArchived` - Hidden from the inbox (terminal)

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{domain_event, EventId, NotificationId, Timestamp, UserId};

use super::NotificationType;

pub const NOTIFICATION_CREATED: &str = "notification.created.v1";
pub const NOTIFICATION_READ: &str = "notification.read.v1";
pub const NOTIFICATION_UNREAD: &str = "notification.unread.v1";
pub const NOTIFICATION_ARCHIVED: &str = "notification.archived.v1";

/// Aggregate type recorded on every notification envelope.
pub const NOTIFICATION_AGGREGATE: &str = "Notification";

// ════════════════════════════════════════════════════════════════════════════
// NotificationCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a notification is created for a user.
///
/// Carries the full snapshot so subscribers never need to read it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationCreated {
    pub event_id: EventId,
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    pub created_at: Timestamp,
}

domain_event!(
    NotificationCreated,
    event_type = NOTIFICATION_CREATED,
    schema_version = 1,
    aggregate_id = notification_id,
    aggregate_type = NOTIFICATION_AGGREGATE,
    occurred_at = created_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// NotificationRead
// ════════════════════════════════════════════════════════════════════════════

/// Published when the owner marks a notification as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRead {
    pub event_id: EventId,
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub read_at: Timestamp,
}

domain_event!(
    NotificationRead,
    event_type = NOTIFICATION_READ,
    schema_version = 1,
    aggregate_id = notification_id,
    aggregate_type = NOTIFICATION_AGGREGATE,
    occurred_at = read_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// NotificationUnread
// ════════════════════════════════════════════════════════════════════════════

/// Published when the owner marks a read notification as unread again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUnread {
    pub event_id: EventId,
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub marked_unread_at: Timestamp,
}

domain_event!(
    NotificationUnread,
    event_type = NOTIFICATION_UNREAD,
    schema_version = 1,
    aggregate_id = notification_id,
    aggregate_type = NOTIFICATION_AGGREGATE,
    occurred_at = marked_unread_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// NotificationArchived
// ════════════════════════════════════════════════════════════════════════════

/// Published when a notification is archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationArchived {
    pub event_id: EventId,
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub archived_at: Timestamp,
}

domain_event!(
    NotificationArchived,
    event_type = NOTIFICATION_ARCHIVED,
    schema_version = 1,
    aggregate_id = notification_id,
    aggregate_type = NOTIFICATION_AGGREGATE,
    occurred_at = archived_at,
    event_id = event_id
);

//! Notification aggregate entity.
//!
//! A notification is a short message addressed to exactly one user
//! (budget alerts, goal milestones, bill reminders, ...). Its only
//! mutable state after creation is the read status.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, Timestamp, UserId};

use super::{NotificationStatus, NotificationType};

/// Maximum length for a notification title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a notification message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Notification aggregate.
///
/// # Invariants
///
/// - `title` is 1-200 characters after trimming
/// - `message` is at most 2000 characters
/// - `read_at` is set whenever status is `Read`
/// - Archived notifications cannot be modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    user_id: UserId,
    title: String,
    message: String,
    notification_type: NotificationType,
    /// Free-form context for the client (budget id, amount, ...).
    data: Option<JsonValue>,
    status: NotificationStatus,
    created_at: Timestamp,
    read_at: Option<Timestamp>,
    updated_at: Timestamp,
}

impl Notification {
    /// Create a new unread notification.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if title is empty or too long, or message is too long
    pub fn new(
        id: NotificationId,
        user_id: UserId,
        notification_type: NotificationType,
        title: String,
        message: String,
        data: Option<JsonValue>,
    ) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        Self::validate_title(&title)?;
        Self::validate_message(&message)?;

        let now = Timestamp::now();
        Ok(Self {
            id,
            user_id,
            title,
            message,
            notification_type,
            data,
            status: NotificationStatus::Unread,
            created_at: now,
            read_at: None,
            updated_at: now,
        })
    }

    /// Reconstitute a notification from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: NotificationId,
        user_id: UserId,
        notification_type: NotificationType,
        title: String,
        message: String,
        data: Option<JsonValue>,
        status: NotificationStatus,
        created_at: Timestamp,
        read_at: Option<Timestamp>,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            message,
            notification_type,
            data,
            status,
            created_at,
            read_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn notification_type(&self) -> NotificationType {
        self.notification_type
    }

    pub fn data(&self) -> Option<&JsonValue> {
        self.data.as_ref()
    }

    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn read_at(&self) -> Option<&Timestamp> {
        self.read_at.as_ref()
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Validates that the user can access this notification.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if user is not the owner
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not authorized to access this notification",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark the notification as read. Returns the read time.
    ///
    /// # Errors
    ///
    /// - `NotificationArchived` if archived
    /// - `InvalidStateTransition` if already read
    pub fn mark_read(&mut self) -> Result<Timestamp, DomainError> {
        let now = self.transition_to(NotificationStatus::Read)?;
        self.read_at = Some(now);
        Ok(now)
    }

    /// Mark a read notification as unread again.
    ///
    /// # Errors
    ///
    /// - `NotificationArchived` if archived
    /// - `InvalidStateTransition` if already unread
    pub fn mark_unread(&mut self) -> Result<Timestamp, DomainError> {
        let now = self.transition_to(NotificationStatus::Unread)?;
        self.read_at = None;
        Ok(now)
    }

    /// Archive the notification. Returns the archive time.
    ///
    /// # Errors
    ///
    /// - `NotificationArchived` if already archived
    pub fn archive(&mut self) -> Result<Timestamp, DomainError> {
        self.transition_to(NotificationStatus::Archived)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn transition_to(&mut self, target: NotificationStatus) -> Result<Timestamp, DomainError> {
        if !self.status.is_mutable() {
            return Err(DomainError::new(
                ErrorCode::NotificationArchived,
                "Cannot modify an archived notification",
            ));
        }
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Notification is already {}", self.status),
            ));
        }

        let now = Timestamp::now();
        self.status = target;
        self.updated_at = now;
        Ok(now)
    }

    fn validate_title(title: &str) -> Result<(), DomainError> {
        if title.is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Title must be {} characters or less", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }

    fn validate_message(message: &str) -> Result<(), DomainError> {
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::validation(
                "message",
                format!("Message must be {} characters or less", MAX_MESSAGE_LENGTH),
            ));
        }
        Ok(())
    }
}

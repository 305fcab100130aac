//! Notification-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId};

/// Notification-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Notification was not found.
    NotFound(NotificationId),
    /// User does not own the notification.
    Forbidden,
    /// Requested status change is not allowed from the current status.
    InvalidTransition(String),
    /// Notification is archived.
    AlreadyArchived,
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl NotificationError {
    pub fn not_found(id: NotificationId) -> Self {
        NotificationError::NotFound(id)
    }
    pub fn forbidden() -> Self {
        NotificationError::Forbidden
    }
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        NotificationError::InvalidTransition(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        NotificationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        NotificationError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            NotificationError::NotFound(_) => ErrorCode::NotificationNotFound,
            NotificationError::Forbidden => ErrorCode::Forbidden,
            NotificationError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            NotificationError::AlreadyArchived => ErrorCode::NotificationArchived,
            NotificationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            NotificationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            NotificationError::NotFound(id) => format!("Notification not found: {}", id),
            NotificationError::Forbidden => "Permission denied".to_string(),
            NotificationError::InvalidTransition(msg) => format!("Invalid transition: {}", msg),
            NotificationError::AlreadyArchived => {
                "Cannot modify archived notification".to_string()
            }
            NotificationError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            NotificationError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for NotificationError {}

impl From<DomainError> for NotificationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            // Hide existence of other users' notifications.
            ErrorCode::NotificationNotFound | ErrorCode::Forbidden => NotificationError::Forbidden,
            ErrorCode::NotificationArchived => NotificationError::AlreadyArchived,
            ErrorCode::InvalidStateTransition => {
                NotificationError::InvalidTransition(err.message)
            }
            ErrorCode::ValidationFailed => NotificationError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => NotificationError::Infrastructure(err.message),
        }
    }
}

//! Notification repository port.
//!
//! Defines the contract for persisting and retrieving Notification aggregates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId, UserId};
use crate::domain::notification::Notification;

/// Repository port for Notification aggregate persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Save a new notification.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure or duplicate id
    async fn save(&self, notification: &Notification) -> Result<(), DomainError>;

    /// Update an existing notification.
    ///
    /// # Errors
    ///
    /// - `NotificationNotFound` if it doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, notification: &Notification) -> Result<(), DomainError>;

    /// Find a notification by its ID.
    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError>;

    /// Find a user's notifications, newest first, archived ones excluded.
    async fn find_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, DomainError>;

    /// Count a user's unread notifications.
    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn NotificationRepository) {}
    }
}

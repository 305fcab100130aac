//! In-memory notification repository.
//!
//! Backs the server in single-process deployments and the use case tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, UserId};
use crate::domain::notification::{Notification, NotificationStatus};
use crate::ports::NotificationRepository;

/// In-memory storage for notifications.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notifications, archived included.
    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn save(&self, notification: &Notification) -> Result<(), DomainError> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(notification.id()) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Notification already exists: {}", notification.id()),
            ));
        }
        notifications.insert(*notification.id(), notification.clone());
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<(), DomainError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(notification.id()) {
            Some(stored) => {
                *stored = notification.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::NotificationNotFound,
                format!("Notification not found: {}", notification.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError> {
        Ok(self.notifications.read().await.get(id).cloned())
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, DomainError> {
        let notifications = self.notifications.read().await;
        let mut found: Vec<Notification> = notifications
            .values()
            .filter(|n| n.is_owner(user_id) && n.status() != NotificationStatus::Archived)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        found.truncate(limit);
        Ok(found)
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let notifications = self.notifications.read().await;
        let count = notifications
            .values()
            .filter(|n| n.is_owner(user_id) && n.is_unread())
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::notification::NotificationType;
    use chrono::{Duration, Utc};

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn notification_at(owner: &str, title: &str, minutes_ago: i64) -> Notification {
        let at = Timestamp::from_datetime(Utc::now() - Duration::minutes(minutes_ago));
        Notification::reconstitute(
            NotificationId::new(),
            user(owner),
            NotificationType::System,
            title.to_string(),
            String::new(),
            None,
            NotificationStatus::Unread,
            at,
            None,
            at,
        )
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemoryNotificationRepository::new();
        let n = notification_at("u1", "hello", 0);

        repo.save(&n).await.unwrap();

        assert_eq!(repo.find_by_id(n.id()).await.unwrap(), Some(n));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_id() {
        let repo = InMemoryNotificationRepository::new();
        let n = notification_at("u1", "hello", 0);

        repo.save(&n).await.unwrap();
        let err = repo.save(&n).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = InMemoryNotificationRepository::new();
        let err = repo.update(&notification_at("u1", "x", 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotificationNotFound);
    }

    #[tokio::test]
    async fn find_by_user_is_newest_first_and_skips_archived() {
        let repo = InMemoryNotificationRepository::new();
        let old = notification_at("u1", "old", 30);
        let new = notification_at("u1", "new", 1);
        let mut archived = notification_at("u1", "archived", 5);
        archived.archive().unwrap();
        let other = notification_at("u2", "other", 0);

        for n in [&old, &new, &archived, &other] {
            repo.save(n).await.unwrap();
        }

        let found = repo.find_by_user(&user("u1"), 10).await.unwrap();
        let titles: Vec<&str> = found.iter().map(|n| n.title()).collect();
        assert_eq!(titles, vec!["new", "old"]);

        let limited = repo.find_by_user(&user("u1"), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn count_unread_counts_only_owner_unread() {
        let repo = InMemoryNotificationRepository::new();
        let mut read = notification_at("u1", "read", 2);
        read.mark_read().unwrap();

        repo.save(&notification_at("u1", "a", 1)).await.unwrap();
        repo.save(&read).await.unwrap();
        repo.save(&notification_at("u2", "b", 1)).await.unwrap();

        assert_eq!(repo.count_unread(&user("u1")).await.unwrap(), 1);
        assert_eq!(repo.count_unread(&user("nobody")).await.unwrap(), 0);
    }
}

//! NotificationStatus and NotificationType enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

impl NotificationStatus {
    /// Returns true if the notification can still change state.
    pub fn is_mutable(&self) -> bool {
        !matches!(self, NotificationStatus::Archived)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Unread -> Read
    /// - Read -> Unread
    /// - Unread | Read -> Archived
    pub fn can_transition_to(&self, target: &NotificationStatus) -> bool {
        use NotificationStatus::*;
        matches!(
            (self, target),
            (Unread, Read) | (Read, Unread) | (Unread, Archived) | (Read, Archived)
        )
    }

    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "unread",
            NotificationStatus::Read => "read",
            NotificationStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Spending reached or passed a budget threshold.
    BudgetAlert,
    /// A savings goal hit a milestone or completed.
    GoalMilestone,
    /// A transaction matched an alert rule (large amount, new payee, ...).
    TransactionAlert,
    /// An account balance dropped below its configured floor.
    LowBalance,
    /// A recurring bill is coming due.
    BillReminder,
    /// Service announcements.
    System,
}

impl NotificationType {
    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::BudgetAlert => "budget_alert",
            NotificationType::GoalMilestone => "goal_milestone",
            NotificationType::TransactionAlert => "transaction_alert",
            NotificationType::LowBalance => "low_balance",
            NotificationType::BillReminder => "bill_reminder",
            NotificationType::System => "system",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

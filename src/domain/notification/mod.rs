//! Notification domain module.
//!
//! Notifications are per-user messages raised by the rest of the finance
//! tracker (budgets, goals, transactions, bills). Every state change is
//! published as an event so live clients can be updated in real time.
//!
//! # Events
//!
//! - `NotificationCreated` - Published when a notification is created
//! - `NotificationRead` - Published when it is marked read
//! - `NotificationUnread` - Published when it is marked unread again
//! - `NotificationArchived` - Published when it is archived

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::{Notification, MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH};
pub use errors::NotificationError;
pub use events::{
    NotificationArchived, NotificationCreated, NotificationRead, NotificationUnread,
    NOTIFICATION_AGGREGATE, NOTIFICATION_ARCHIVED, NOTIFICATION_CREATED, NOTIFICATION_READ,
    NOTIFICATION_UNREAD,
};
pub use status::{NotificationStatus, NotificationType};

//! Notification command handlers.

mod change_status;
mod create_notification;

pub use change_status::{
    ChangeNotificationStatusCommand, ChangeNotificationStatusHandler,
    ChangeNotificationStatusResult, StatusChange,
};
pub use create_notification::{
    CreateNotificationCommand, CreateNotificationHandler, CreateNotificationResult,
};

//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod notification;

pub use notification::{
    ChangeNotificationStatusCommand, ChangeNotificationStatusHandler,
    ChangeNotificationStatusResult, CreateNotificationCommand, CreateNotificationHandler,
    CreateNotificationResult, StatusChange,
};

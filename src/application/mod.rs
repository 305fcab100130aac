//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every successful command publishes a domain event, which is what drives
//! real-time delivery to connected clients.

pub mod handlers;

pub use handlers::{
    ChangeNotificationStatusCommand, ChangeNotificationStatusHandler,
    ChangeNotificationStatusResult, CreateNotificationCommand, CreateNotificationHandler,
    CreateNotificationResult, StatusChange,
};

//! Finance Tracker - Real-time notification delivery
//!
//! Delivers per-user notifications (budget alerts, goal milestones, bill
//! reminders) to every live browser session of that user over WebSocket,
//! driven by the domain events the notification use cases publish.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Notification Ports
//!
//! - `NotificationRepository` - Notification persistence
//! - `NotificationDispatcher` - Real-time delivery to live clients
//!
//! ## Identity
//!
//! - `SessionValidator` - Bearer token validation

mod event_publisher;
mod event_subscriber;
mod notification_dispatcher;
mod notification_repository;
mod session_validator;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use notification_dispatcher::{
    DeliveryOutcome, DispatchError, NotificationDispatcher, NotificationUpdate, NotificationView,
    UpdateType,
};
pub use notification_repository::NotificationRepository;
pub use session_validator::SessionValidator;

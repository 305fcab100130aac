//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validators (JWT, mock)
//! - `events` - In-process event bus
//! - `notification` - Notification repository implementations
//! - `websocket` - Real-time delivery to connected clients

pub mod auth;
pub mod events;
pub mod notification;
pub mod websocket;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use events::InMemoryEventBus;
pub use notification::InMemoryNotificationRepository;

//! WebSocket adapters for real-time notification delivery.
//!
//! Pushes notification events to every live client of the owning user.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Event Bus                                    │
//! │   notification.created.v1 │ .read.v1 │ .unread.v1 │ .archived.v1     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ subscribes
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  NotificationEventBridge                             │
//! │   EventEnvelope → NotificationEvent → dispatcher call                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            WebSocketNotificationDispatcher                           │
//! │   serialize once → OutboundPayload                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ send_to_user
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    ConnectionRegistry                                │
//! │   user-1: conn-a, conn-b       user-2: conn-c                        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ try_send (evict when full)
//!                                     ▼
//!                    Connection mailbox → write loop → socket
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`connection`] - Per-connection mailbox and read/write loops
//! - [`registry`] - User → connections directory and fan-out
//! - [`dispatcher`] - `NotificationDispatcher` implementation
//! - [`event_bridge`] - Bridge between event bus and dispatcher
//! - [`handler`] - Axum upgrade handler with admission checks

pub mod connection;
pub mod dispatcher;
pub mod event_bridge;
pub mod handler;
pub mod messages;
pub mod registry;

pub use connection::{Connection, ConnectionHandle, ConnectionId, ConnectionSettings, Mailbox};
pub use dispatcher::WebSocketNotificationDispatcher;
pub use event_bridge::{NotificationEvent, NotificationEventBridge, NOTIFICATION_EVENT_TYPES};
pub use handler::{
    authenticate_upgrade, extract_token, health_handler, realtime_router, ws_handler,
    AdmissionError, RealtimeState, TokenQuery,
};
pub use messages::{
    ClientMessage, ConnectedMessage, NotificationMessage, OutboundPayload, PongMessage,
    ServerMessage,
};
pub use registry::{ConnectionRegistry, DeliveryOutcome};

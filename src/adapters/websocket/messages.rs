//! WebSocket message types for real-time notification delivery.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, notifications, updates, pongs
//! - Client → Server: pings (anything else is ignored)

use std::sync::Arc;

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use crate::ports::{NotificationUpdate, NotificationView};

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established and registered.
    Connected(ConnectedMessage),

    /// A new notification for the user.
    Notification(NotificationMessage),

    /// A notification the client already holds changed state.
    NotificationUpdate(NotificationUpdate),

    /// Reply to a client `ping`.
    Pong(PongMessage),
}

impl ServerMessage {
    /// Serializes the message once into a shareable payload.
    pub fn to_payload(&self) -> Result<OutboundPayload, serde_json::Error> {
        serde_json::to_string(self).map(OutboundPayload::from)
    }
}

/// First frame on every connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub user_id: String,
    /// Unix seconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub data: NotificationView,
}

/// Heartbeat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongMessage {
    /// Unix seconds.
    pub timestamp: i64,
}

// ============================================
// Client → Server Messages
// ============================================

/// Message types the server understands from clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,

    /// Any other `type`; accepted and ignored.
    #[serde(other)]
    Unknown,
}

// ============================================
// Internal Types
// ============================================

/// A serialized server message, shared by every mailbox it is queued on.
///
/// The registry and connections never look inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload(Arc<str>);

impl OutboundPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps the payload in its own text frame.
    pub fn to_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}

impl From<String> for OutboundPayload {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&str> for OutboundPayload {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::NotificationId;
    use crate::ports::UpdateType;
    use serde_json::{json, Value};

    #[test]
    fn pong_serializes_with_numeric_timestamp() {
        let payload = ServerMessage::Pong(PongMessage { timestamp: 1_700_000_000 })
            .to_payload()
            .unwrap();
        let value: Value = serde_json::from_str(payload.as_str()).unwrap();
        assert_eq!(value, json!({"type": "pong", "timestamp": 1_700_000_000}));
    }

    #[test]
    fn update_fields_sit_next_to_the_type_tag() {
        let id = NotificationId::new();
        let msg = ServerMessage::NotificationUpdate(NotificationUpdate::new(id, UpdateType::Read));
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "notification_update");
        assert_eq!(value["notification_id"], id.to_string());
        assert_eq!(value["update_type"], "read");
    }

    #[test]
    fn connected_message_shape() {
        let msg = ServerMessage::Connected(ConnectedMessage {
            connection_id: "c-1".to_string(),
            user_id: "u-1".to_string(),
            timestamp: 42,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "connected", "connection_id": "c-1", "user_id": "u-1", "timestamp": 42})
        );
    }

    #[test]
    fn client_ping_parses() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn unknown_client_type_is_tolerated() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","topic":"x"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn payload_becomes_text_frame() {
        let payload = OutboundPayload::from("{\"type\":\"x\"}");
        assert_eq!(payload.to_message(), Message::Text("{\"type\":\"x\"}".to_string()));
    }
}

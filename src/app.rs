//! Composition root for real-time notification delivery.
//!
//! ```text
//! CreateNotificationHandler ─┐
//!                            ├─► InMemoryEventBus ─► NotificationEventBridge
//! ChangeNotificationStatus ──┘                              │
//!                                                           ▼
//!        /ws/notifications ─► ConnectionRegistry ◄─ WebSocketNotificationDispatcher
//! ```
//!
//! The rest of the finance tracker (budget checks, bill reminders, the
//! notification REST API) holds a [`NotificationService`] and raises or
//! changes notifications through its command handlers. Every successful
//! command reaches the live sessions of the owning user.

use std::sync::Arc;

use axum::Router;

use crate::adapters::websocket::{
    realtime_router, ConnectionRegistry, ConnectionSettings, NotificationEventBridge,
    RealtimeState, WebSocketNotificationDispatcher,
};
use crate::adapters::InMemoryEventBus;
use crate::application::{ChangeNotificationStatusHandler, CreateNotificationHandler};
use crate::ports::{NotificationDispatcher, NotificationRepository, SessionValidator};

/// Notification use cases wired to the WebSocket delivery path.
pub struct NotificationService {
    registry: Arc<ConnectionRegistry>,
    event_bus: Arc<InMemoryEventBus>,
    create_notification: CreateNotificationHandler,
    change_status: ChangeNotificationStatusHandler,
    realtime: RealtimeState,
}

impl NotificationService {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        validator: Arc<dyn SessionValidator>,
        settings: ConnectionSettings,
    ) -> Self {
        Self::with_event_bus(repository, validator, settings, InMemoryEventBus::new())
    }

    /// Same as [`new`](Self::new) with a caller-supplied bus, e.g. one built
    /// with [`InMemoryEventBus::with_capture`].
    pub fn with_event_bus(
        repository: Arc<dyn NotificationRepository>,
        validator: Arc<dyn SessionValidator>,
        settings: ConnectionSettings,
        event_bus: InMemoryEventBus,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher: Arc<dyn NotificationDispatcher> =
            Arc::new(WebSocketNotificationDispatcher::new(registry.clone()));
        let event_bus = Arc::new(event_bus);
        NotificationEventBridge::new_shared(dispatcher).register(&*event_bus);

        Self {
            create_notification: CreateNotificationHandler::new(
                repository.clone(),
                event_bus.clone(),
            ),
            change_status: ChangeNotificationStatusHandler::new(repository, event_bus.clone()),
            realtime: RealtimeState::new(registry.clone(), validator, settings),
            registry,
            event_bus,
        }
    }

    pub fn create_notification(&self) -> &CreateNotificationHandler {
        &self.create_notification
    }

    pub fn change_status(&self) -> &ChangeNotificationStatusHandler {
        &self.change_status
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Other reactors may subscribe here alongside the WebSocket bridge.
    pub fn event_bus(&self) -> &Arc<InMemoryEventBus> {
        &self.event_bus
    }

    /// `/ws/notifications` and `/health`, with state applied.
    pub fn router(&self) -> Router {
        realtime_router().with_state(self.realtime.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::Connection;
    use crate::adapters::{InMemoryNotificationRepository, MockSessionValidator};
    use crate::application::{
        ChangeNotificationStatusCommand, CreateNotificationCommand, StatusChange,
    };
    use crate::domain::foundation::{CommandMetadata, UserId};
    use crate::domain::notification::{NotificationType, NOTIFICATION_CREATED};
    use axum::body::Body;
    use axum::extract::ws::Message;
    use axum::http::{Request, StatusCode};
    use futures::channel::mpsc as fmpsc;
    use futures::StreamExt;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::timeout;
    use tower::ServiceExt;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn service() -> NotificationService {
        NotificationService::with_event_bus(
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(MockSessionValidator::new()),
            ConnectionSettings::default(),
            InMemoryEventBus::with_capture(),
        )
    }

    async fn next_json(rx: &mut fmpsc::UnboundedReceiver<Message>) -> Value {
        loop {
            let frame = timeout(Duration::from_secs(2), rx.next())
                .await
                .expect("timed out waiting for frame")
                .expect("connection closed");
            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn commands_reach_live_sessions_of_owner() {
        let service = service();
        let connection =
            Connection::open(service.registry().clone(), user("alice"), ConnectionSettings::default())
                .await;
        let (server_tx, mut server_rx) = fmpsc::unbounded::<Message>();
        let (_client_tx, client_rx) = fmpsc::unbounded::<Result<Message, String>>();
        let task = tokio::spawn(connection.run(server_tx, client_rx));
        assert_eq!(next_json(&mut server_rx).await["type"], "connected");

        let created = service
            .create_notification()
            .handle(
                CreateNotificationCommand {
                    user_id: user("alice"),
                    notification_type: NotificationType::LowBalance,
                    title: "Checking below $100".to_string(),
                    message: "Your checking account balance is $84.12.".to_string(),
                    data: None,
                },
                CommandMetadata::new(user("balance-monitor")),
            )
            .await
            .unwrap();
        let id = *created.notification.id();

        let frame = next_json(&mut server_rx).await;
        assert_eq!(frame["type"], "notification");
        assert_eq!(frame["data"]["notification_id"], id.to_string());

        service
            .change_status()
            .handle(
                ChangeNotificationStatusCommand {
                    notification_id: id,
                    user_id: user("alice"),
                    change: StatusChange::MarkRead,
                },
                CommandMetadata::new(user("alice")),
            )
            .await
            .unwrap();

        let frame = next_json(&mut server_rx).await;
        assert_eq!(frame["type"], "notification_update");
        assert_eq!(frame["update_type"], "read");

        assert!(service.event_bus().has_event(NOTIFICATION_CREATED));
        task.abort();
    }

    #[tokio::test]
    async fn router_serves_health_with_shared_registry() {
        let service = service();
        let _connection =
            Connection::open(service.registry().clone(), user("bob"), ConnectionSettings::default())
                .await;

        let response = service
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["connections"], 1);
    }
}

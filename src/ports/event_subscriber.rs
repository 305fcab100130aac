//! EventSubscriber port - Registering interest in domain events.
//!
//! The real-time bridge and any other reactor subscribe here by event type
//! string; they never see how the bus moves envelopes around.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Reacts to one published event.
///
/// The in-process bus awaits handlers one after another inside `publish`, so
/// a handler that blocks delays the command that published the event.
/// Returning an error is reported to the publisher but does not stop the
/// remaining handlers.
///
/// # Example
///
/// ```ignore
/// #[async_trait]
/// impl EventHandler for UnreadBadgeCounter {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let created: NotificationCreated = event.payload_as()?;
///         self.bump(&created.user_id);
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "UnreadBadgeCounter"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Used in log lines and error reports.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
pub trait EventSubscriber: Send + Sync {
    /// Routes every future event of `event_type` to `handler`.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Routes several event types to the same handler instance.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.subscribe(event_type, Arc::clone(&handler));
        }
    }
}

/// Anything that can both publish and accept subscriptions.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct NamedHandler;

    #[async_trait]
    impl EventHandler for NamedHandler {
        async fn handle(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "NamedHandler"
        }
    }

    #[derive(Default)]
    struct RecordingSubscriber {
        subscriptions: Mutex<Vec<(String, &'static str)>>,
    }

    impl EventSubscriber for RecordingSubscriber {
        fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
            self.subscriptions
                .lock()
                .unwrap()
                .push((event_type.to_string(), handler.name()));
        }
    }

    #[test]
    fn subscribe_all_defaults_to_one_subscribe_per_type() {
        let subscriber = RecordingSubscriber::default();

        subscriber.subscribe_all(
            &["notification.created.v1", "notification.read.v1"],
            Arc::new(NamedHandler),
        );

        let subscriptions = subscriber.subscriptions.lock().unwrap();
        assert_eq!(
            *subscriptions,
            vec![
                ("notification.created.v1".to_string(), "NamedHandler"),
                ("notification.read.v1".to_string(), "NamedHandler"),
            ]
        );
    }

    #[test]
    fn ports_are_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EventHandler>();
        assert_send_sync::<dyn EventSubscriber>();
    }
}

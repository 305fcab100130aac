//! In-memory event bus.
//!
//! Delivers events synchronously to in-process handlers. This is the bus the
//! server runs with (single process, no external broker) and the one tests
//! use for deterministic delivery.
//!
//! Published events are only retained when capture is enabled with
//! [`InMemoryEventBus::with_capture`], so a long-running server does not
//! accumulate every event it ever published.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// In-memory event bus.
///
/// Features:
/// - Synchronous delivery in subscription order
/// - Every handler runs even if an earlier one fails; failures are combined
/// - Optional event capture for assertions
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::with_capture());
/// bus.subscribe_all(NOTIFICATION_EVENT_TYPES, bridge);
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("notification.created.v1"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: Option<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventBus {
    /// Creates a bus that does not retain published events.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: None,
        }
    }

    /// Creates a bus that records every published event.
    pub fn with_capture() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: Some(RwLock::new(Vec::new())),
        }
    }

    fn handlers_read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Arc<dyn EventHandler>>>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers_write(
        &self,
    ) -> RwLockWriteGuard<'_, HashMap<String, Vec<Arc<dyn EventHandler>>>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    // === Capture helpers ===

    /// Returns all captured events. Empty when capture is disabled.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        match &self.published {
            Some(published) => published
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            None => Vec::new(),
        }
    }

    /// Returns captured events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns captured events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Clears captured events.
    pub fn clear(&self) {
        if let Some(published) = &self.published {
            published
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    /// Returns count of captured events.
    pub fn event_count(&self) -> usize {
        match &self.published {
            Some(published) => published.read().unwrap_or_else(PoisonError::into_inner).len(),
            None => 0,
        }
    }

    /// Checks if a specific event type was captured.
    pub fn has_event(&self, event_type: &str) -> bool {
        match &self.published {
            Some(published) => published
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .any(|e| e.event_type == event_type),
            None => false,
        }
    }

    /// Number of handlers subscribed to an event type.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers_read().get(event_type).map_or(0, Vec::len)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if let Some(published) = &self.published {
            published
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }

        // Clone handlers to release lock before await points
        let type_handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers_read()
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        debug!(
            event_type = %event.event_type,
            event_id = %event.event_id,
            handlers = type_handlers.len(),
            "Publishing event"
        );

        let mut errors = Vec::new();
        for handler in type_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    error = %e,
                    "Event handler failed"
                );
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers_write()
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers_write();
        for event_type in event_types {
            handlers
                .entry(event_type.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}

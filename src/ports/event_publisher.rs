//! EventPublisher port - Interface for publishing domain events.
//!
//! Use cases publish through this port without knowing which transport
//! carries the events (in-process bus today).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Every subscribed handler sees the event, even if another handler fails
/// - Errors are propagated to the caller
///
/// # Example
///
/// ```ignore
/// let envelope = metadata.stamp(event.to_envelope()?);
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events in order.
    ///
    /// Adapters without transactional support publish sequentially and
    /// stop at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_publisher_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EventPublisher>();
    }
}

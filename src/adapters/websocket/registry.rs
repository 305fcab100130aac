//! Process-wide directory of live connections, keyed by user.
//!
//! ```text
//! user-1 ── conn-a, conn-b      (two tabs)
//! user-2 ── conn-c
//! ```
//!
//! All membership changes and delivery lookups go through one lock. The lock
//! is never held while enqueueing onto a mailbox; mailbox capacity is what
//! bounds memory per connection.

use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::foundation::UserId;
pub use crate::ports::DeliveryOutcome;

use super::connection::{ConnectionHandle, ConnectionId};
use super::messages::OutboundPayload;

/// Live connections grouped by owning user.
///
/// # Invariants
///
/// - A connection is filed under the user on its handle, and only there
/// - A user entry exists only while it holds at least one connection
/// - A torn-down connection is never registered again
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, HashMap<ConnectionId, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection under its user.
    ///
    /// Returns false if the connection is already registered or has already
    /// been torn down.
    pub async fn register(&self, handle: ConnectionHandle) -> bool {
        let mut connections = self.connections.write().await;
        // Checked under the lock: nothing is inserted after its unregister ran.
        if handle.is_closed() {
            warn!(connection_id = %handle.id(), "Refusing to register a closed connection");
            return false;
        }

        let user_connections = connections.entry(handle.user_id().clone()).or_default();
        if user_connections.contains_key(&handle.id()) {
            return false;
        }

        debug!(
            connection_id = %handle.id(),
            user_id = %handle.user_id(),
            user_connections = user_connections.len() + 1,
            "Connection registered"
        );
        user_connections.insert(handle.id(), handle);
        true
    }

    /// Removes a connection, closing its mailbox and cancelling its tasks.
    ///
    /// Returns true only for the call that actually removed it.
    pub async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let Some(user_connections) = connections.get_mut(user_id) else {
            return false;
        };
        let removed = user_connections.remove(connection_id);
        if user_connections.is_empty() {
            connections.remove(user_id);
        }

        match removed {
            Some(handle) => {
                handle.shutdown_token().cancel();
                true
            }
            None => false,
        }
    }

    /// Enqueues `payload` on every connection of `user_id` without waiting.
    ///
    /// A connection whose mailbox is full is evicted; one whose mailbox is
    /// already closed is unregistered. Neither affects the other connections.
    pub async fn send_to_user(&self, user_id: &UserId, payload: &OutboundPayload) -> DeliveryOutcome {
        let targets: Vec<ConnectionHandle> = {
            let connections = self.connections.read().await;
            match connections.get(user_id) {
                Some(user_connections) => user_connections.values().cloned().collect(),
                None => return DeliveryOutcome::default(),
            }
        };

        let mut outcome = DeliveryOutcome::default();
        for handle in targets {
            match handle.try_deliver(payload.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        connection_id = %handle.id(),
                        user_id = %user_id,
                        "Mailbox full, evicting slow connection"
                    );
                    self.unregister(user_id, &handle.id()).await;
                    outcome.evicted += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        connection_id = %handle.id(),
                        user_id = %user_id,
                        "Mailbox closed, dropping connection"
                    );
                    self.unregister(user_id, &handle.id()).await;
                    outcome.evicted += 1;
                }
            }
        }
        outcome
    }

    /// Number of live connections for a user.
    pub async fn client_count(&self, user_id: &UserId) -> usize {
        self.connections
            .read()
            .await
            .get(user_id)
            .map_or(0, HashMap::len)
    }

    /// Number of live connections across all users.
    pub async fn total_clients(&self) -> usize {
        self.connections.read().await.values().map(HashMap::len).sum()
    }

    /// Users with at least one live connection.
    pub async fn connected_users(&self) -> Vec<UserId> {
        self.connections.read().await.keys().cloned().collect()
    }
}

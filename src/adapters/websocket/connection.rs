//! A single live client connection.
//!
//! Each connection runs exactly two tasks for its whole lifetime:
//!
//! ```text
//!             ┌──────────── read loop ────────────┐
//!  transport ─┤ read deadline, ping → pong        ├─ control ─┐
//!             └───────────────────────────────────┘           │
//!                                                             ▼
//!  registry ── mailbox (bounded) ──────────────────────► write loop ── transport
//!                                                      (single writer,
//!                                                       ping ticker)
//! ```
//!
//! Either task ending tears the connection down: it is unregistered (which
//! closes the mailbox) and its shutdown token is cancelled (which stops the
//! read loop). Teardown is idempotent, so both tasks run it on exit.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, UserId};

use super::messages::{ClientMessage, ConnectedMessage, OutboundPayload, PongMessage, ServerMessage};
use super::registry::ConnectionRegistry;

/// Server-generated identifier of one connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tuning for a connection's mailbox and loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Payloads a mailbox holds before the connection counts as stalled.
    pub mailbox_capacity: usize,
    /// Longest gap between inbound frames before the peer is presumed dead.
    pub read_timeout: Duration,
    /// Bound on one write (including coalesced payloads and flush).
    pub write_timeout: Duration,
    /// Interval between transport-level pings.
    pub ping_interval: Duration,
    /// Extra queued payloads written together with the one just received.
    pub max_coalesce: usize,
    /// Pending control replies (pongs) the write loop will buffer.
    pub control_capacity: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(54),
            max_coalesce: 32,
            control_capacity: 16,
        }
    }
}

/// The registry's view of a connection: who it belongs to and how to reach it.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: UserId,
    mailbox: mpsc::Sender<OutboundPayload>,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Creates a handle and the receiving end of its mailbox.
    pub fn new(user_id: UserId, mailbox_capacity: usize) -> (Self, Mailbox) {
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            user_id,
            mailbox: tx,
            shutdown: CancellationToken::new(),
        };
        (handle, Mailbox(rx))
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// True once the connection has been torn down.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Non-blocking enqueue onto the mailbox.
    pub(crate) fn try_deliver(
        &self,
        payload: OutboundPayload,
    ) -> Result<(), TrySendError<OutboundPayload>> {
        self.mailbox.try_send(payload)
    }
}

/// Receiving end of a connection's outbound queue.
#[derive(Debug)]
pub struct Mailbox(mpsc::Receiver<OutboundPayload>);

impl Mailbox {
    /// Next payload, or `None` once the registry dropped the connection
    /// and everything queued has been taken.
    pub async fn recv(&mut self) -> Option<OutboundPayload> {
        self.0.recv().await
    }

    pub fn try_recv(&mut self) -> Result<OutboundPayload, TryRecvError> {
        self.0.try_recv()
    }
}

/// A registered connection waiting for its transport.
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    mailbox: Mailbox,
    shutdown: CancellationToken,
    registry: Arc<ConnectionRegistry>,
    settings: ConnectionSettings,
}

impl Connection {
    /// Creates the connection's mailbox and registers it for `user_id`.
    pub async fn open(
        registry: Arc<ConnectionRegistry>,
        user_id: UserId,
        settings: ConnectionSettings,
    ) -> Self {
        let (handle, mailbox) = ConnectionHandle::new(user_id.clone(), settings.mailbox_capacity);
        let id = handle.id();
        let shutdown = handle.shutdown_token().clone();
        let registered = registry.register(handle).await;
        debug_assert!(registered, "fresh connection handle was refused by the registry");

        Self {
            id,
            user_id,
            mailbox,
            shutdown,
            registry,
            settings,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Drives the connection until either side ends it.
    ///
    /// Spawns the read and write loops and waits for both. On return the
    /// connection is unregistered and the sink has been closed.
    pub async fn run<S, R, E>(self, sink: S, stream: R)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display,
    {
        let Connection {
            id,
            user_id,
            mailbox,
            shutdown,
            registry,
            settings,
        } = self;

        let (control_tx, control_rx) = mpsc::channel(settings.control_capacity.max(1));
        let teardown = Teardown {
            id,
            user_id: user_id.clone(),
            shutdown: shutdown.clone(),
            registry,
        };

        let reader = tokio::spawn({
            let teardown = teardown.clone();
            let reader = ReadLoop {
                id,
                user_id: user_id.clone(),
                control: control_tx,
                shutdown: shutdown.clone(),
                read_timeout: settings.read_timeout,
            };
            async move {
                reader.run(stream).await;
                teardown.run().await;
            }
        });

        let writer = tokio::spawn({
            let writer = WriteLoop {
                id,
                user_id,
                mailbox,
                control: control_rx,
                shutdown,
                settings,
            };
            async move {
                writer.run(sink).await;
                teardown.run().await;
            }
        });

        let (read_result, write_result) = tokio::join!(reader, writer);
        for result in [read_result, write_result] {
            if let Err(e) = result {
                warn!(connection_id = %id, error = %e, "Connection task failed");
            }
        }
    }
}

#[derive(Clone)]
struct Teardown {
    id: ConnectionId,
    user_id: UserId,
    shutdown: CancellationToken,
    registry: Arc<ConnectionRegistry>,
}

impl Teardown {
    async fn run(&self) {
        self.shutdown.cancel();
        if self.registry.unregister(&self.user_id, &self.id).await {
            debug!(connection_id = %self.id, user_id = %self.user_id, "Connection closed");
        }
    }
}

// ============================================
// Read loop
// ============================================

struct ReadLoop {
    id: ConnectionId,
    user_id: UserId,
    control: mpsc::Sender<Message>,
    shutdown: CancellationToken,
    read_timeout: Duration,
}

impl ReadLoop {
    async fn run<R, E>(self, mut stream: R)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        loop {
            // Every frame, control or not, restarts the deadline.
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                next = timeout(self.read_timeout, stream.next()) => next,
            };

            let frame = match next {
                Err(_) => {
                    debug!(connection_id = %self.id, "Read deadline exceeded");
                    break;
                }
                Ok(None) => {
                    debug!(connection_id = %self.id, "Client stream ended");
                    break;
                }
                Ok(Some(Err(e))) => {
                    debug!(connection_id = %self.id, error = %e, "Receive error");
                    break;
                }
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                Message::Text(text) => self.on_text(&text),
                Message::Binary(_) => {
                    trace!(connection_id = %self.id, "Ignoring binary frame");
                }
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(_) => {
                    debug!(connection_id = %self.id, "Client sent close frame");
                    break;
                }
            }
        }
    }

    fn on_text(&self, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Ping) => {
                let pong = ServerMessage::Pong(PongMessage {
                    timestamp: Timestamp::now().as_unix_secs(),
                });
                match pong.to_payload() {
                    Ok(payload) => {
                        if self.control.try_send(payload.to_message()).is_err() {
                            debug!(connection_id = %self.id, "Control queue full, dropping pong");
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize pong"),
                }
            }
            Ok(ClientMessage::Unknown) => {
                trace!(connection_id = %self.id, "Ignoring unknown client message");
            }
            Err(e) => {
                debug!(
                    connection_id = %self.id,
                    user_id = %self.user_id,
                    error = %e,
                    "Ignoring malformed client message"
                );
            }
        }
    }
}

// ============================================
// Write loop
// ============================================

#[derive(Debug, Error)]
enum WriteError {
    #[error("write deadline exceeded")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

struct WriteLoop {
    id: ConnectionId,
    user_id: UserId,
    mailbox: Mailbox,
    control: mpsc::Receiver<Message>,
    shutdown: CancellationToken,
    settings: ConnectionSettings,
}

impl WriteLoop {
    async fn run<S>(mut self, mut sink: S)
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        if let Err(e) = self.send_connected(&mut sink).await {
            debug!(connection_id = %self.id, error = %e, "Failed to send connected message");
        } else {
            self.pump(&mut sink).await;
        }

        match timeout(self.settings.write_timeout, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => trace!(connection_id = %self.id, error = %e, "Close failed"),
            Err(_) => trace!(connection_id = %self.id, "Close timed out"),
        }
    }

    async fn send_connected<S>(&self, sink: &mut S) -> Result<(), WriteError>
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        let connected = ServerMessage::Connected(ConnectedMessage {
            connection_id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            timestamp: Timestamp::now().as_unix_secs(),
        });
        let payload = connected
            .to_payload()
            .map_err(|e| WriteError::Transport(e.to_string()))?;
        self.write(sink, vec![payload.to_message()]).await
    }

    async fn pump<S>(&mut self, sink: &mut S)
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        let period = self.settings.ping_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;

        loop {
            let frames = tokio::select! {
                biased;

                reply = self.control.recv(), if control_open => match reply {
                    Some(frame) => vec![frame],
                    None => {
                        control_open = false;
                        continue;
                    }
                },

                payload = self.mailbox.recv() => match payload {
                    Some(first) => self.coalesce(first),
                    None => {
                        debug!(connection_id = %self.id, "Mailbox closed");
                        break;
                    }
                },

                _ = ticker.tick() => vec![Message::Ping(Vec::new())],

                _ = self.shutdown.cancelled() => break,
            };

            if let Err(e) = self.write(sink, frames).await {
                debug!(connection_id = %self.id, error = %e, "Write failed, closing connection");
                break;
            }
        }
    }

    /// `first` plus whatever is already queued, up to `max_coalesce` more.
    fn coalesce(&mut self, first: OutboundPayload) -> Vec<Message> {
        let mut frames = vec![first.to_message()];
        while frames.len() <= self.settings.max_coalesce {
            match self.mailbox.try_recv() {
                Ok(next) => frames.push(next.to_message()),
                Err(_) => break,
            }
        }
        frames
    }

    /// Feeds every frame and flushes once, all under one deadline.
    async fn write<S>(&self, sink: &mut S, frames: Vec<Message>) -> Result<(), WriteError>
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        let write = async {
            for frame in frames {
                sink.feed(frame).await?;
            }
            sink.flush().await
        };

        match timeout(self.settings.write_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(WriteError::Transport(e.to_string())),
            Err(_) => Err(WriteError::Timeout),
        }
    }
}

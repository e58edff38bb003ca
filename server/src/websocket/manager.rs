//! WebSocket connection manager.
//!
//! Tracks active WebSocket connections per session and delivers notices to
//! them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::ServerMessage;
use crate::notify::{NoticeKind, Notifier, TracingNotifier};
use crate::session::SessionId;

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// A single WebSocket connection.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: String,
    /// Session the connection belongs to
    pub session_id: SessionId,
    /// Channel to send messages to this connection
    pub sender: MessageSender,
}

/// Manages active WebSocket connections.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// All active connections, keyed by connection ID.
    connections: DashMap<String, Connection>,
    /// Index of connections by session for efficient lookup.
    by_session: DashMap<SessionId, Vec<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            by_session: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection.
    ///
    /// Returns the connection ID.
    pub fn register(&self, session_id: SessionId, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();

        let connection = Connection {
            id: conn_id.clone(),
            session_id: session_id.clone(),
            sender,
        };

        self.connections.insert(conn_id.clone(), connection);
        self.by_session
            .entry(session_id.clone())
            .or_default()
            .push(conn_id.clone());

        tracing::info!(conn_id = %conn_id, session = %session_id, "WebSocket connection registered");

        conn_id
    }

    /// Unregister a connection.
    pub fn unregister(&self, conn_id: &str) {
        if let Some((_, conn)) = self.connections.remove(conn_id) {
            if let Some(mut conn_ids) = self.by_session.get_mut(&conn.session_id) {
                conn_ids.retain(|id| id != conn_id);
                if conn_ids.is_empty() {
                    drop(conn_ids);
                    self.by_session.remove(&conn.session_id);
                }
            }

            tracing::info!(conn_id = %conn.id, session = %conn.session_id, "WebSocket connection unregistered");
        }
    }

    /// Send a message to every connection of a session.
    ///
    /// Returns the number of connections that received the message.
    pub fn send_to_session(&self, session_id: &SessionId, message: ServerMessage) -> usize {
        let conn_ids = match self.by_session.get(session_id) {
            Some(ids) => ids.value().clone(),
            None => return 0,
        };

        let sent_count = conn_ids
            .iter()
            .filter(|id| self.send_to(id, message.clone()))
            .count();

        tracing::debug!(
            session = %session_id,
            recipients = sent_count,
            "Sent message to session"
        );

        sent_count
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn_id: &str, message: ServerMessage) -> bool {
        match self.connections.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// A notifier delivering to `session_id`'s connections.
    pub fn notifier_for(&self, session_id: SessionId) -> SessionNotifier<'_> {
        SessionNotifier {
            manager: self,
            session_id,
        }
    }

    /// Get the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of sessions with at least one connection.
    pub fn session_count(&self) -> usize {
        self.by_session.len()
    }
}

/// Delivers notices to one session's WebSocket connections, and to the log.
#[derive(Debug)]
pub struct SessionNotifier<'a> {
    manager: &'a ConnectionManager,
    session_id: SessionId,
}

impl Notifier for SessionNotifier<'_> {
    fn notify(&self, kind: NoticeKind, message: &str) {
        TracingNotifier.notify(kind, message);
        self.manager
            .send_to_session(&self.session_id, ServerMessage::notice(kind, message));
    }
}

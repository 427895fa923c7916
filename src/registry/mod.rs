//! Live-connection registry.
//!
//! The registry is the single source of truth for board membership: each
//! entry holds both the connection's outbound channel and its presence
//! metadata, so there is no side table to drift out of sync.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::websocket::ServerEvent;

/// Handle for a single WebSocket connection
pub struct ConnectionHandle {
    /// Client-supplied identifier; unique per session, not validated
    pub user_id: String,
    /// Distinguishes this session from a later one reusing the same user_id
    pub session: Uuid,
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<ServerEvent>,
    closed: Notify,
}

impl ConnectionHandle {
    pub fn new(user_id: String, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            user_id,
            session: Uuid::new_v4(),
            connected_at: Utc::now(),
            sender,
            closed: Notify::new(),
        }
    }

    pub async fn send(&self, event: ServerEvent) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event).await
    }

    /// Signal the connection task to tear down. The permit is stored, so the
    /// signal is not lost if fired before the task starts waiting.
    pub fn close(&self) {
        self.closed.notify_one();
    }

    /// Resolves once `close` has been called on this handle.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}

/// Registry of all currently connected clients, keyed by client identifier.
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Insert or replace the entry for `user_id`.
    ///
    /// A prior entry for the same identifier is explicitly closed before the
    /// new handle is installed, so a reconnecting client never leaks its old
    /// channel.
    pub fn register(&self, user_id: String, sender: mpsc::Sender<ServerEvent>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(user_id, sender));

        if let Some(previous) = self.connections.insert(handle.user_id.clone(), handle.clone()) {
            previous.close();
            tracing::warn!(
                user_id = %handle.user_id,
                old_session = %previous.session,
                new_session = %handle.session,
                "Replaced existing connection for client identifier"
            );
        }

        tracing::info!(user_id = %handle.user_id, session = %handle.session, "Connection registered");

        handle
    }

    /// Remove the entry for this handle. Only removes if the current entry is
    /// still this session; a stale connection that was already replaced must
    /// not evict its replacement. Returns whether an entry was removed.
    pub fn deregister(&self, handle: &ConnectionHandle) -> bool {
        let removed = self
            .connections
            .remove_if(&handle.user_id, |_, current| current.session == handle.session)
            .is_some();

        if removed {
            tracing::info!(user_id = %handle.user_id, session = %handle.session, "Connection deregistered");
        }

        removed
    }

    /// Point-in-time copy of the current membership.
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    pub fn get(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(user_id).map(|h| h.clone())
    }

    /// Current membership count, reported to clients as the presence number.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

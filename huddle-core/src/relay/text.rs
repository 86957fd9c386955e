use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::connection::{ConnectionHandle, Payload};
use crate::models::{ConnectionId, SessionId};

/// In-memory table of chat subscribers, keyed by session.
///
/// Entries are created lazily on the first `join` and removed inline the
/// moment membership becomes empty; no background sweep runs. The map is
/// sharded, so operations on different sessions proceed in parallel while
/// membership mutation for a single session is serialized by its entry lock.
#[derive(Clone)]
pub struct TextBroadcastGroup {
    sessions: Arc<DashMap<SessionId, Vec<ConnectionHandle>>>,
}

impl TextBroadcastGroup {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Add a connection to the session's chat group.
    ///
    /// Creates the group if absent. Joining twice with the same connection is
    /// a no-op (set semantics).
    pub fn join(&self, session_id: &SessionId, conn: ConnectionHandle) {
        let mut members = self.sessions.entry(session_id.clone()).or_default();
        if members.iter().any(|c| c.id() == conn.id()) {
            return;
        }
        debug!(
            session_id = %session_id,
            connection_id = %conn.id(),
            "connection joined text session"
        );
        members.push(conn);
    }

    /// Remove a connection from the session's chat group.
    ///
    /// No-op if the session or connection is absent; disconnect races are
    /// expected. Deletes the session entry once the group is empty.
    pub fn leave(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        if let Some(mut members) = self.sessions.get_mut(session_id) {
            members.retain(|c| c.id() != connection_id);
            let empty = members.is_empty();
            drop(members); // Drop the RefMut before removing
            if empty {
                self.sessions.remove_if(session_id, |_, m| m.is_empty());
                debug!(session_id = %session_id, "text session has no more members, removed");
            }
        }
    }

    /// Deliver a payload to every member of the session.
    ///
    /// Iterates over a snapshot taken at call start, so membership changes
    /// during delivery never skip or double-visit a member. Members whose
    /// channel turns out to be dead are evicted as part of this call.
    /// Broadcasting to an unknown session is valid and delivers to nobody.
    ///
    /// Returns the number of successful deliveries.
    pub fn broadcast(&self, session_id: &SessionId, payload: &Payload) -> usize {
        let Some(members) = self.sessions.get(session_id).map(|m| m.value().clone()) else {
            return 0;
        };

        let mut sent_count = 0;
        let mut failed_connections = Vec::new();

        for conn in &members {
            match conn.send(payload.clone()) {
                Ok(()) => sent_count += 1,
                Err(err) => {
                    warn!(
                        session_id = %session_id,
                        connection_id = %conn.id(),
                        error = %err,
                        "failed to deliver text message, evicting connection"
                    );
                    failed_connections.push(conn.id().clone());
                }
            }
        }

        for connection_id in failed_connections {
            self.leave(session_id, &connection_id);
        }

        sent_count
    }

    /// Number of members currently in the session
    #[must_use]
    pub fn member_count(&self, session_id: &SessionId) -> usize {
        self.sessions.get(session_id).map_or(0, |m| m.len())
    }

    /// Number of sessions with at least one member
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for TextBroadcastGroup {
    fn default() -> Self {
        Self::new()
    }
}

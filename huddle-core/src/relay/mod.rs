//! In-memory connection/session relay.
//!
//! Two tables keyed by session id: a chat fan-out group and a
//! broadcaster/viewer signaling relay, composed behind [`RelayManager`].
//! Delivery is best-effort; a failed send evicts the dead connection and is
//! never surfaced to the caller. Nothing survives a restart.

pub mod connection;
pub mod stream;
pub mod text;

pub use connection::{ConnectionHandle, Payload, SendError};
pub use stream::{StreamRelay, StreamRole};
pub use text::TextBroadcastGroup;

use crate::models::{ConnectionId, SessionId};

/// Façade over the two relay tables used by the connection-handling layer.
///
/// Owns no state beyond the tables themselves and performs no cross-table
/// logic. Per-session serialization of membership mutations comes from the
/// tables' sharded entry locks; calls on different sessions run in parallel.
#[derive(Clone, Default)]
pub struct RelayManager {
    text: TextBroadcastGroup,
    stream: StreamRelay,
}

impl RelayManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a session's chat stream
    pub fn join_text(&self, session_id: &SessionId, conn: ConnectionHandle) {
        self.text.join(session_id, conn);
    }

    /// Remove a connection from a session's chat stream
    pub fn leave_text(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        self.text.leave(session_id, connection_id);
    }

    /// Fan a chat payload out to every member; returns deliveries made
    pub fn send_text(&self, session_id: &SessionId, payload: &Payload) -> usize {
        self.text.broadcast(session_id, payload)
    }

    /// Register a connection in a session's stream group under a role
    pub fn join_stream(&self, session_id: &SessionId, conn: ConnectionHandle, role: StreamRole) {
        self.stream.connect(session_id, conn, role);
    }

    /// Deregister a connection from a session's stream group
    pub fn leave_stream(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        self.stream.disconnect(session_id, connection_id);
    }

    /// Route a signaling payload by the sender's current role; returns
    /// deliveries made
    pub fn send_signal(
        &self,
        session_id: &SessionId,
        signal: &Payload,
        sender: &ConnectionId,
    ) -> usize {
        self.stream.relay(session_id, signal, sender)
    }

    /// Members subscribed to a session's chat stream
    #[must_use]
    pub fn text_member_count(&self, session_id: &SessionId) -> usize {
        self.text.member_count(session_id)
    }

    /// Viewers registered in a session's stream group
    #[must_use]
    pub fn stream_viewer_count(&self, session_id: &SessionId) -> usize {
        self.stream.viewer_count(session_id)
    }

    /// Live sessions across both tables (a session using both counts twice)
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.text.session_count() + self.stream.session_count()
    }
}

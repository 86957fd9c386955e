use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::connection::{ConnectionHandle, Payload};
use crate::models::{ConnectionId, SessionId};

/// Role of a connection in a stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamRole {
    Broadcaster,
    Viewer,
}

impl StreamRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Broadcaster => "broadcaster",
            Self::Viewer => "viewer",
        }
    }
}

impl std::str::FromStr for StreamRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcaster" => Ok(Self::Broadcaster),
            "viewer" => Ok(Self::Viewer),
            other => Err(crate::Error::InvalidInput(format!(
                "Invalid stream role: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for StreamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of one stream session: at most one broadcaster plus viewers in
/// join order. A connection is never in both slots at once.
#[derive(Debug, Default)]
struct StreamGroup {
    broadcaster: Option<ConnectionHandle>,
    viewers: Vec<ConnectionHandle>,
}

impl StreamGroup {
    fn is_empty(&self) -> bool {
        self.broadcaster.is_none() && self.viewers.is_empty()
    }
}

/// Delivery targets for one relay call, snapshotted under the entry lock
enum RelayTargets {
    Viewers(Vec<ConnectionHandle>),
    Broadcaster(ConnectionHandle),
    Nobody,
}

/// In-memory table routing signaling payloads between one broadcaster and
/// many viewers per session.
///
/// The table holds membership only; a sender's role is re-derived from
/// membership at relay time rather than stored per connection. Entries are
/// created lazily on `connect` and removed inline once both slots are empty.
#[derive(Clone)]
pub struct StreamRelay {
    sessions: Arc<DashMap<SessionId, StreamGroup>>,
}

impl StreamRelay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Register a connection under the given role.
    ///
    /// A broadcaster registration unconditionally replaces any previous
    /// broadcaster; the displaced connection stays open but is no longer
    /// reachable through this session. Registering an existing viewer again
    /// is a no-op. A connection switching roles leaves its old slot first.
    pub fn connect(&self, session_id: &SessionId, conn: ConnectionHandle, role: StreamRole) {
        let mut group = self.sessions.entry(session_id.clone()).or_default();
        match role {
            StreamRole::Broadcaster => {
                group.viewers.retain(|v| v.id() != conn.id());
                let conn_id = conn.id().clone();
                if let Some(old) = group.broadcaster.replace(conn) {
                    if old.id() != &conn_id {
                        debug!(
                            session_id = %session_id,
                            old_connection_id = %old.id(),
                            new_connection_id = %conn_id,
                            "broadcaster replaced"
                        );
                    }
                }
            }
            StreamRole::Viewer => {
                if group
                    .broadcaster
                    .as_ref()
                    .is_some_and(|b| b.id() == conn.id())
                {
                    group.broadcaster = None;
                }
                if !group.viewers.iter().any(|v| v.id() == conn.id()) {
                    group.viewers.push(conn);
                }
            }
        }
    }

    /// Deregister a connection from whichever slot holds it.
    ///
    /// No-op if the session is absent or the connection holds no slot;
    /// repeated disconnects are expected and must not fault. Deletes the
    /// session entry once both slots are empty.
    pub fn disconnect(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        if let Some(mut group) = self.sessions.get_mut(session_id) {
            if group
                .broadcaster
                .as_ref()
                .is_some_and(|b| b.id() == connection_id)
            {
                group.broadcaster = None;
            } else {
                group.viewers.retain(|v| v.id() != connection_id);
            }
            let empty = group.is_empty();
            drop(group); // Drop the RefMut before removing
            if empty {
                self.sessions.remove_if(session_id, |_, g| g.is_empty());
                debug!(session_id = %session_id, "stream session is empty, removed");
            }
        }
    }

    /// Route a signaling payload according to the sender's current role.
    ///
    /// From the broadcaster the payload fans out to every viewer; from a
    /// viewer it goes to the broadcaster alone. A sender holding no role
    /// (already evicted by a race) and an unknown session are both no-ops.
    /// Failed deliveries evict the dead receiving connection, never the
    /// sender.
    ///
    /// Returns the number of successful deliveries.
    pub fn relay(&self, session_id: &SessionId, signal: &Payload, sender: &ConnectionId) -> usize {
        // Snapshot targets under the entry lock; deliver after releasing it.
        let targets = {
            let Some(group) = self.sessions.get(session_id) else {
                return 0;
            };
            if group.broadcaster.as_ref().is_some_and(|b| b.id() == sender) {
                RelayTargets::Viewers(group.viewers.clone())
            } else if group.viewers.iter().any(|v| v.id() == sender) {
                group
                    .broadcaster
                    .as_ref()
                    .map_or(RelayTargets::Nobody, |b| {
                        RelayTargets::Broadcaster(b.clone())
                    })
            } else {
                debug!(
                    session_id = %session_id,
                    connection_id = %sender,
                    "signal from connection with no current role, dropped"
                );
                return 0;
            }
        };

        match targets {
            RelayTargets::Viewers(viewers) => {
                let mut sent_count = 0;
                let mut failed_connections = Vec::new();
                for viewer in &viewers {
                    match viewer.send(signal.clone()) {
                        Ok(()) => sent_count += 1,
                        Err(err) => {
                            warn!(
                                session_id = %session_id,
                                connection_id = %viewer.id(),
                                error = %err,
                                "failed to deliver signal, evicting viewer"
                            );
                            failed_connections.push(viewer.id().clone());
                        }
                    }
                }
                for connection_id in failed_connections {
                    self.evict_viewer(session_id, &connection_id);
                }
                sent_count
            }
            RelayTargets::Broadcaster(broadcaster) => match broadcaster.send(signal.clone()) {
                Ok(()) => 1,
                Err(err) => {
                    warn!(
                        session_id = %session_id,
                        connection_id = %broadcaster.id(),
                        error = %err,
                        "failed to deliver signal, evicting broadcaster"
                    );
                    self.evict_broadcaster(session_id, broadcaster.id());
                    0
                }
            },
            RelayTargets::Nobody => 0,
        }
    }

    /// Remove a dead viewer; unlike `disconnect` this never touches the
    /// broadcaster slot, so a viewer that re-registered as broadcaster
    /// between snapshot and eviction is left alone.
    fn evict_viewer(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        if let Some(mut group) = self.sessions.get_mut(session_id) {
            group.viewers.retain(|v| v.id() != connection_id);
            let empty = group.is_empty();
            drop(group);
            if empty {
                self.sessions.remove_if(session_id, |_, g| g.is_empty());
            }
        }
    }

    /// Clear the broadcaster slot, but only if it still holds the connection
    /// the failed delivery was addressed to.
    fn evict_broadcaster(&self, session_id: &SessionId, connection_id: &ConnectionId) {
        if let Some(mut group) = self.sessions.get_mut(session_id) {
            if group
                .broadcaster
                .as_ref()
                .is_some_and(|b| b.id() == connection_id)
            {
                group.broadcaster = None;
            }
            let empty = group.is_empty();
            drop(group);
            if empty {
                self.sessions.remove_if(session_id, |_, g| g.is_empty());
            }
        }
    }

    /// Whether the session currently has a broadcaster
    #[must_use]
    pub fn has_broadcaster(&self, session_id: &SessionId) -> bool {
        self.sessions
            .get(session_id)
            .is_some_and(|g| g.broadcaster.is_some())
    }

    /// Number of viewers currently in the session
    #[must_use]
    pub fn viewer_count(&self, session_id: &SessionId) -> usize {
        self.sessions.get(session_id).map_or(0, |g| g.viewers.len())
    }

    /// Number of sessions with any registered connection
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for StreamRelay {
    fn default() -> Self {
        Self::new()
    }
}

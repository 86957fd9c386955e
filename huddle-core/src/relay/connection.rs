use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::ConnectionId;

/// Opaque payload forwarded verbatim to a participant. The relay never parses
/// or validates it; cloning is cheap so one serialized frame can fan out to
/// every member.
pub type Payload = Arc<str>;

/// Delivery to a specific connection failed: the receiving half is gone.
#[derive(Debug, thiserror::Error)]
#[error("connection {0} is closed")]
pub struct SendError(pub ConnectionId);

/// Non-owning reference to one duplex channel.
///
/// The handle carries the connection's identity and the sending half of its
/// outbound queue. The relay never closes the channel; it only stops
/// forwarding once the handle is evicted. Closing is the connection handler's
/// responsibility.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Payload>,
}

impl ConnectionHandle {
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<Payload>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a handle together with the receiving half of its outbound
    /// queue. The caller pumps the receiver into the actual transport.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    #[must_use]
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Queue a payload for this connection.
    ///
    /// Fails only when the receiver has been dropped, which the relay treats
    /// as the connection being dead.
    pub fn send(&self, payload: Payload) -> Result<(), SendError> {
        self.sender
            .send(payload)
            .map_err(|_| SendError(self.id.clone()))
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

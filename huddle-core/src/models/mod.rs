pub mod chat;
pub mod id;
pub mod session;

pub use chat::ChatMessage;
pub use id::{generate_id, ConnectionId, SessionId};
pub use session::{Session, SessionKind};

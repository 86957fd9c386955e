pub mod chat;
pub mod session;

pub use chat::ChatRepository;
pub use session::SessionRepository;

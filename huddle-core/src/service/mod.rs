pub mod chat;
pub mod session;

pub use chat::ChatService;
pub use session::SessionService;

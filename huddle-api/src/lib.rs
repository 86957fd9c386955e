//! Huddle HTTP/WebSocket layer.

pub mod http;

//! WebSocket module for live session snapshots

mod connection;
mod protocol;
mod registry;

pub use connection::{WsParams, session_ws};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::ConnectionRegistry;

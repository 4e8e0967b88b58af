//! WebSocket protocol message types
//!
//! Browser and CLI clients speak the same protocol: the server pushes a full
//! snapshot after every write, clients send small intents back.

use serde::{Deserialize, Serialize};
use tabshare_core::Session;

use crate::error::ServerError;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register in the presence map under the connection's participant id
    Join { display_name: String },

    /// Flip the connection's claim on an item
    Toggle { item_id: String },

    /// Leave the session, dropping every claim
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The whole document as of the latest write
    Snapshot { session: Session },

    /// A subscription or intent failed; the last snapshot is still current
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn error(error: &ServerError) -> Self {
        ServerMessage::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

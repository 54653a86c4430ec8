use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WorkspaceEvent {
    /// Server confirms the session token
    Ready { email: String },

    /// A message was appended to a channel
    MessageCreate { message: Message },
}

impl WorkspaceEvent {
    /// Returns the channel_id if this event is scoped to a specific channel.
    /// Events that return `None` go to every connection.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::MessageCreate { message } => Some(&message.channel_id),
            Self::Ready { .. } => None,
        }
    }
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Authenticate the connection with a session token
    Identify { token: String },

    /// Replace the set of channels whose events this connection receives
    Subscribe { channel_ids: Vec<String> },
}

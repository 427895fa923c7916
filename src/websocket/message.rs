use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{ChatMessage, Reply, Thread};

fn default_name() -> String {
    "Guest".to_string()
}

/// Frames sent from client to server.
///
/// Only `chat_message` is recognized; anything else fails to parse and is
/// rejected at the boundary with an `error` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "chat_message")]
    ChatMessage {
        message: String,
        #[serde(default = "default_name")]
        name: String,
    },
}

/// Events pushed from server to client by the fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "new_thread")]
    NewThread { thread: Thread },
    #[serde(rename = "new_reply")]
    NewReply { thread_id: Uuid, reply: Reply },
    #[serde(rename = "user_joined")]
    UserJoined { user_id: String, active_users: usize },
    #[serde(rename = "user_left")]
    UserLeft { user_id: String, active_users: usize },
    #[serde(rename = "chat_message")]
    ChatMessage { message: ChatMessage },
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Wire tag for this event, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewThread { .. } => "new_thread",
            Self::NewReply { .. } => "new_reply",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::ChatMessage { .. } => "chat_message",
            Self::Error { .. } => "error",
        }
    }
}

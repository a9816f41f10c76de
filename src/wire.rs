//! Wire protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::engine::Message;
use crate::error::RelayError;
use crate::types::{MessageId, SessionId};

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Post a new chat message
    PostMessage { content: String },
    /// Edit a previously posted message (author only)
    EditMessage {
        message_id: MessageId,
        new_content: String,
    },
    /// Delete a previously posted message (author only)
    DeleteMessage { message_id: MessageId },
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake ack: the session id and nickname assigned to this connection
    Connected {
        session_id: SessionId,
        nickname: String,
    },
    /// Roster as it stood before this session connected (newcomer only)
    ConnectedUsers { users: Vec<String> },
    /// A session joined (everyone)
    UserConnected {
        session_id: SessionId,
        nickname: String,
    },
    /// Full roster after any connect or disconnect (everyone)
    UpdatedUserList { users: Vec<String> },
    /// A session left (everyone)
    UserDisconnected {
        session_id: SessionId,
        nickname: String,
    },
    /// A new message was posted (everyone)
    MessagePosted { message: Message },
    /// A message's content changed (everyone)
    MessageEdited { message: Message },
    /// A message was removed; payload is its pre-deletion state (everyone)
    MessageDeleted { message: Message },
    /// Request rejected (requester only)
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Edit/delete attempted by a session that is not the author
    Forbidden,
    /// Invalid message format
    InvalidMessage,
}

/// Convert RelayError to ServerMessage for requester-only notification
impl From<RelayError> for ServerMessage {
    fn from(err: RelayError) -> Self {
        let (code, message) = match &err {
            RelayError::Forbidden(id) => (
                ErrorCode::Forbidden,
                format!("Only the author may modify message {}", id),
            ),
            RelayError::Json(e) => (
                ErrorCode::InvalidMessage,
                format!("Invalid message format: {}", e),
            ),
            // Fatal errors are not surfaced (connection closes);
            // UnknownSender/MessageNotFound are dropped silently upstream.
            _ => (ErrorCode::InvalidMessage, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}

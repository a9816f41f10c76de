//! Error types for the chat relay
//!
//! Defines transport-level errors and relay-logic errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::MessageId;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and logical
/// relay errors (absorbed at the failing operation, never broadcast).
#[derive(Debug, Error)]
pub enum RelayError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Message posted by a disconnected or unrecognized session
    #[error("Unknown sender")]
    UnknownSender,

    /// Edit/delete target is not in the message log
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// Edit/delete attempted by a session other than the author
    #[error("Not the author of message {0}")]
    Forbidden(MessageId),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

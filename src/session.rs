//! Connected session handle
//!
//! The server actor's view of one connection: its id, assigned
//! nickname, and the outbound channel for fan-out delivery.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::SessionId;
use crate::wire::ServerMessage;

/// Delivery handle for a connected session.
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Nickname assigned by the registry at connect time
    pub nickname: String,
    /// Server → client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl SessionHandle {
    pub fn new(id: SessionId, nickname: String, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            nickname,
            sender,
        }
    }

    /// Send a message to this session.
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers() {
        let (tx, mut rx) = mpsc::channel(32);
        let session = SessionHandle::new(SessionId::new(), "User1".to_string(), tx);

        session
            .send(ServerMessage::UpdatedUserList {
                users: vec!["User1".to_string()],
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            ServerMessage::UpdatedUserList { users } => {
                assert_eq!(users, vec!["User1".to_string()])
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_to_closed_channel_errors() {
        let (tx, rx) = mpsc::channel(32);
        drop(rx);
        let session = SessionHandle::new(SessionId::new(), "User1".to_string(), tx);

        let result = session
            .send(ServerMessage::UpdatedUserList { users: vec![] })
            .await;
        assert!(matches!(result, Err(SendError::ChannelClosed)));
    }
}

//! RelayServer actor implementation
//!
//! The central actor that owns all mutable state: the session registry,
//! the message log, and the per-session delivery handles. Uses the
//! Actor pattern with mpsc channels for message passing, so every
//! connect/disconnect/post/edit/delete is serialized through one task
//! and the roster order, nickname assignment, and find-then-mutate
//! sequences are never interleaved.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::BroadcastEngine;
use crate::error::RelayError;
use crate::registry::SessionRegistry;
use crate::session::SessionHandle;
use crate::types::{MessageId, SessionId};
use crate::wire::ServerMessage;

/// Commands sent from connection handlers to the RelayServer actor
#[derive(Debug)]
pub enum RelayCommand {
    /// New session connected
    Connect {
        session_id: SessionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Session disconnected
    Disconnect { session_id: SessionId },
    /// Post a chat message
    Post {
        session_id: SessionId,
        content: String,
    },
    /// Edit an existing message
    Edit {
        session_id: SessionId,
        message_id: MessageId,
        new_content: String,
    },
    /// Delete an existing message
    Delete {
        session_id: SessionId,
        message_id: MessageId,
    },
}

/// The main RelayServer actor
pub struct RelayServer {
    /// Live roster, source of truth for nicknames
    registry: SessionRegistry,
    /// Message log and id allocation
    engine: BroadcastEngine,
    /// Delivery handles for fan-out: SessionId -> SessionHandle
    sessions: HashMap<SessionId, SessionHandle>,
    /// Command receiver channel
    receiver: mpsc::Receiver<RelayCommand>,
}

impl RelayServer {
    /// Create a new RelayServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<RelayCommand>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            engine: BroadcastEngine::new(),
            sessions: HashMap::new(),
            receiver,
        }
    }

    /// Run the RelayServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("RelayServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("RelayServer shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { session_id, sender } => {
                self.handle_connect(session_id, sender).await;
            }
            RelayCommand::Disconnect { session_id } => {
                self.handle_disconnect(session_id).await;
            }
            RelayCommand::Post {
                session_id,
                content,
            } => {
                self.handle_post(session_id, content).await;
            }
            RelayCommand::Edit {
                session_id,
                message_id,
                new_content,
            } => {
                self.handle_edit(session_id, message_id, new_content).await;
            }
            RelayCommand::Delete {
                session_id,
                message_id,
            } => {
                self.handle_delete(session_id, message_id).await;
            }
        }
    }

    /// Handle new session connection
    async fn handle_connect(&mut self, session_id: SessionId, sender: mpsc::Sender<ServerMessage>) {
        let (nickname, roster_before) = self.registry.connect(session_id);
        info!("Session {} connected as {}", session_id, nickname);

        let session = SessionHandle::new(session_id, nickname.clone(), sender);

        // The newcomer gets its identity and the roster as it stood
        // before it joined.
        let _ = session
            .send(ServerMessage::Connected {
                session_id,
                nickname: nickname.clone(),
            })
            .await;
        let _ = session
            .send(ServerMessage::ConnectedUsers {
                users: roster_before,
            })
            .await;

        self.sessions.insert(session_id, session);

        self.broadcast(ServerMessage::UserConnected {
            session_id,
            nickname,
        })
        .await;
        self.broadcast(ServerMessage::UpdatedUserList {
            users: self.registry.roster(),
        })
        .await;

        debug!("Total sessions: {}", self.sessions.len());
    }

    /// Handle session disconnection
    ///
    /// Disconnect of an unknown id is a silent no-op.
    async fn handle_disconnect(&mut self, session_id: SessionId) {
        let Some(nickname) = self.registry.disconnect(session_id) else {
            debug!("Disconnect for unknown session {}", session_id);
            return;
        };

        self.sessions.remove(&session_id);
        info!("Session {} ({}) disconnected", session_id, nickname);

        self.broadcast(ServerMessage::UserDisconnected {
            session_id,
            nickname,
        })
        .await;
        self.broadcast(ServerMessage::UpdatedUserList {
            users: self.registry.roster(),
        })
        .await;

        debug!("Total sessions: {}", self.sessions.len());
    }

    /// Handle a new chat message
    async fn handle_post(&mut self, session_id: SessionId, content: String) {
        match self.engine.post(&self.registry, session_id, content) {
            Ok(message) => {
                self.broadcast(ServerMessage::MessagePosted { message }).await;
            }
            Err(e) => {
                // Message from an unrecognized session is dropped, not broadcast
                debug!("Dropping post from {}: {}", session_id, e);
            }
        }
    }

    /// Handle a message edit
    async fn handle_edit(
        &mut self,
        session_id: SessionId,
        message_id: MessageId,
        new_content: String,
    ) {
        match self.engine.edit(session_id, message_id, new_content) {
            Ok(message) => {
                self.broadcast(ServerMessage::MessageEdited { message }).await;
            }
            Err(e) => self.reject(session_id, e).await,
        }
    }

    /// Handle a message deletion
    async fn handle_delete(&mut self, session_id: SessionId, message_id: MessageId) {
        match self.engine.delete(session_id, message_id) {
            Ok(message) => {
                self.broadcast(ServerMessage::MessageDeleted { message }).await;
            }
            Err(e) => self.reject(session_id, e).await,
        }
    }

    /// Absorb a failed edit/delete locally.
    ///
    /// `Forbidden` is surfaced to the requester only; everything else is
    /// dropped with a log line. Other sessions never see the failure.
    async fn reject(&self, session_id: SessionId, err: RelayError) {
        match err {
            RelayError::Forbidden(_) => {
                if let Some(session) = self.sessions.get(&session_id) {
                    let _ = session.send(err.into()).await;
                }
            }
            _ => {
                debug!("Dropping request from {}: {}", session_id, err);
            }
        }
    }

    /// Fan a message out to every connected session.
    ///
    /// Fire-and-forget: a closed recipient channel never affects
    /// delivery to the others.
    async fn broadcast(&self, msg: ServerMessage) {
        for session in self.sessions.values() {
            let _ = session.send(msg.clone()).await;
        }
    }
}

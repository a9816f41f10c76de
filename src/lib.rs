//! Real-Time Chat Relay Library
//!
//! A WebSocket chat relay built with tokio-tungstenite using the Actor
//! pattern for state management. Connected clients receive a live
//! roster of participants and exchange messages that can be posted,
//! edited, and deleted, with every event fanned out to all sessions.
//!
//! # Features
//! - WebSocket connection handling
//! - Automatic nickname assignment (User1, User2, ...)
//! - Live roster broadcasts on every connect/disconnect
//! - Post/edit/delete with author-only authorization
//! - Best-effort in-process fan-out
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RelayServer` is the central actor owning the session registry and
//!   the message log
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{RelayServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(RelayServer::new(cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod engine;
pub mod error;
pub mod handler;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;
pub mod wire;

// Re-export main types for convenience
pub use engine::{BroadcastEngine, Message};
pub use error::{RelayError, SendError};
pub use handler::handle_connection;
pub use registry::SessionRegistry;
pub use server::{RelayCommand, RelayServer};
pub use session::SessionHandle;
pub use types::{MessageId, SessionId};
pub use wire::{ClientMessage, ErrorCode, ServerMessage};

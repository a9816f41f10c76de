//! Message broadcast engine
//!
//! Owns the mutable message log, enforces authorship on edit/delete,
//! and hands back the resulting message for the server actor to fan
//! out. Like the registry this is pure state: it computes the new log
//! plus the event to broadcast, delivery is someone else's job.

use serde::Serialize;

use crate::error::RelayError;
use crate::registry::SessionRegistry;
use crate::types::{MessageId, SessionId};

/// One posted chat message.
///
/// `session_id` is the authorship token: only the session that posted
/// a message may edit or delete it. `nickname` is a snapshot taken at
/// post time and is never re-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub nickname: String,
    pub content: String,
}

/// The in-memory message log.
///
/// Insertion-ordered; edit mutates content in place, delete removes
/// exactly one entry and preserves the order of the rest. Ids come
/// from a counter that never repeats within the process lifetime.
#[derive(Debug, Default)]
pub struct BroadcastEngine {
    log: Vec<Message>,
    next_id: u64,
}

impl BroadcastEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new message posted by `author`.
    ///
    /// Fails with `UnknownSender` if the author does not resolve to a
    /// live session; such messages are dropped, not broadcast.
    pub fn post(
        &mut self,
        registry: &SessionRegistry,
        author: SessionId,
        content: String,
    ) -> Result<Message, RelayError> {
        let nickname = registry
            .nickname_of(author)
            .ok_or(RelayError::UnknownSender)?
            .to_string();

        self.next_id += 1;
        let message = Message {
            id: MessageId(self.next_id),
            session_id: author,
            nickname,
            content,
        };
        self.log.push(message.clone());
        Ok(message)
    }

    /// Replace a message's content in place.
    ///
    /// Only the author may edit; id, author and nickname are unchanged.
    pub fn edit(
        &mut self,
        requester: SessionId,
        id: MessageId,
        new_content: String,
    ) -> Result<Message, RelayError> {
        let index = self.authorized_index(requester, id)?;
        self.log[index].content = new_content;
        Ok(self.log[index].clone())
    }

    /// Remove a message from the log, returning its pre-deletion state.
    pub fn delete(&mut self, requester: SessionId, id: MessageId) -> Result<Message, RelayError> {
        let index = self.authorized_index(requester, id)?;
        Ok(self.log.remove(index))
    }

    /// Locate a message and check that `requester` authored it.
    fn authorized_index(&self, requester: SessionId, id: MessageId) -> Result<usize, RelayError> {
        let index = self
            .log
            .iter()
            .position(|m| m.id == id)
            .ok_or(RelayError::MessageNotFound(id))?;
        if self.log[index].session_id != requester {
            return Err(RelayError::Forbidden(id));
        }
        Ok(index)
    }

    /// Current log contents in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[SessionId]) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for &id in ids {
            registry.connect(id);
        }
        registry
    }

    #[test]
    fn test_post_snapshots_nickname() {
        let author = SessionId::new();
        let registry = registry_with(&[author]);
        let mut engine = BroadcastEngine::new();

        let message = engine.post(&registry, author, "hello".to_string()).unwrap();
        assert_eq!(message.nickname, "User1");
        assert_eq!(message.session_id, author);
        assert_eq!(engine.messages(), &[message]);
    }

    #[test]
    fn test_post_from_unknown_sender_is_dropped() {
        let registry = registry_with(&[SessionId::new()]);
        let mut engine = BroadcastEngine::new();

        let result = engine.post(&registry, SessionId::new(), "hi".to_string());
        assert!(matches!(result, Err(RelayError::UnknownSender)));
        assert!(engine.messages().is_empty());
    }

    #[test]
    fn test_message_ids_unique_under_rapid_posts() {
        let author = SessionId::new();
        let registry = registry_with(&[author]);
        let mut engine = BroadcastEngine::new();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let message = engine.post(&registry, author, "x".to_string()).unwrap();
            assert!(seen.insert(message.id));
        }
    }

    #[test]
    fn test_edit_by_author() {
        let author = SessionId::new();
        let registry = registry_with(&[author]);
        let mut engine = BroadcastEngine::new();

        let posted = engine.post(&registry, author, "draft".to_string()).unwrap();
        let edited = engine
            .edit(author, posted.id, "final".to_string())
            .unwrap();

        assert_eq!(edited.id, posted.id);
        assert_eq!(edited.session_id, author);
        assert_eq!(edited.nickname, posted.nickname);
        assert_eq!(edited.content, "final");
        assert_eq!(engine.messages()[0].content, "final");
    }

    #[test]
    fn test_edit_by_non_author_rejected() {
        let author = SessionId::new();
        let other = SessionId::new();
        let registry = registry_with(&[author, other]);
        let mut engine = BroadcastEngine::new();

        let posted = engine.post(&registry, author, "mine".to_string()).unwrap();
        let result = engine.edit(other, posted.id, "stolen".to_string());

        assert!(matches!(result, Err(RelayError::Forbidden(_))));
        assert_eq!(engine.messages()[0].content, "mine");
    }

    #[test]
    fn test_edit_missing_message() {
        let mut engine = BroadcastEngine::new();
        let result = engine.edit(SessionId::new(), MessageId(99), "x".to_string());
        assert!(matches!(result, Err(RelayError::MessageNotFound(_))));
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        let author = SessionId::new();
        let registry = registry_with(&[author]);
        let mut engine = BroadcastEngine::new();

        let first = engine.post(&registry, author, "1".to_string()).unwrap();
        let second = engine.post(&registry, author, "2".to_string()).unwrap();
        let third = engine.post(&registry, author, "3".to_string()).unwrap();

        let removed = engine.delete(author, second.id).unwrap();
        assert_eq!(removed.content, "2");
        assert_eq!(engine.messages(), &[first, third]);
    }

    #[test]
    fn test_foreign_delete_then_author_delete() {
        let a = SessionId::new();
        let b = SessionId::new();
        let registry = registry_with(&[a, b]);
        let mut engine = BroadcastEngine::new();

        // B posts; A's delete is rejected and leaves the log unchanged
        let posted = engine.post(&registry, b, "hi".to_string()).unwrap();
        assert!(matches!(
            engine.delete(a, posted.id),
            Err(RelayError::Forbidden(_))
        ));
        assert_eq!(engine.messages().len(), 1);

        // B deletes their own message
        let removed = engine.delete(b, posted.id).unwrap();
        assert_eq!(removed, posted);
        assert!(engine.messages().is_empty());
    }

    #[test]
    fn test_author_token_survives_disconnect() {
        let author = SessionId::new();
        let mut registry = registry_with(&[author]);
        let mut engine = BroadcastEngine::new();

        let posted = engine.post(&registry, author, "hi".to_string()).unwrap();
        registry.disconnect(author);

        // The message and its authorship token persist after disconnect;
        // the (now dead) author id still authorizes the edit.
        assert_eq!(engine.messages().len(), 1);
        let edited = engine.edit(author, posted.id, "still mine".to_string()).unwrap();
        assert_eq!(edited.content, "still mine");
    }
}

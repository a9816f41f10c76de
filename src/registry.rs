//! Session registry
//!
//! Tracks currently connected participants in insertion order, assigns
//! display names, and serves as the source of truth for the roster.
//! Pure state: the server actor calls it, the transport never sees it.

use crate::types::SessionId;

/// One roster entry: a connected session and its assigned nickname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: SessionId,
    pub nickname: String,
}

/// The live roster of connected sessions.
///
/// Nicknames are `User1`, `User2`, ... from a counter that only ever
/// increments, so a label is never handed out twice even after
/// disconnects shrink the roster.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: Vec<RosterEntry>,
    next_user: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly connected session.
    ///
    /// Returns the assigned nickname together with the roster snapshot
    /// as it stood immediately before insertion (for the newcomer's
    /// "connected users" notice).
    pub fn connect(&mut self, id: SessionId) -> (String, Vec<String>) {
        let before = self.roster();
        self.next_user += 1;
        let nickname = format!("User{}", self.next_user);
        self.entries.push(RosterEntry {
            id,
            nickname: nickname.clone(),
        });
        (nickname, before)
    }

    /// Remove a session, returning its nickname.
    ///
    /// Disconnect of an unknown id is tolerated silently (None).
    pub fn disconnect(&mut self, id: SessionId) -> Option<String> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos).nickname)
    }

    /// Resolve a live session's nickname.
    pub fn nickname_of(&self, id: SessionId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.nickname.as_str())
    }

    /// Current nicknames in insertion order.
    pub fn roster(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.nickname.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_nicknames() {
        let mut registry = SessionRegistry::new();
        for k in 1..=5 {
            let (nickname, _) = registry.connect(SessionId::new());
            assert_eq!(nickname, format!("User{}", k));
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_connect_returns_pre_insertion_snapshot() {
        let mut registry = SessionRegistry::new();
        let (_, snapshot) = registry.connect(SessionId::new());
        assert!(snapshot.is_empty());

        let (nickname, snapshot) = registry.connect(SessionId::new());
        assert_eq!(nickname, "User2");
        // Snapshot excludes the newcomer itself
        assert_eq!(snapshot, vec!["User1".to_string()]);
    }

    #[test]
    fn test_disconnect_returns_nickname() {
        let mut registry = SessionRegistry::new();
        let a = SessionId::new();
        let b = SessionId::new();
        registry.connect(a);
        registry.connect(b);

        assert_eq!(registry.disconnect(a).as_deref(), Some("User1"));
        assert_eq!(registry.roster(), vec!["User2".to_string()]);
    }

    #[test]
    fn test_disconnect_unknown_id_is_noop() {
        let mut registry = SessionRegistry::new();
        registry.connect(SessionId::new());

        assert!(registry.disconnect(SessionId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_counter_not_reused_after_churn() {
        let mut registry = SessionRegistry::new();
        let a = SessionId::new();
        registry.connect(a); // User1
        registry.connect(SessionId::new()); // User2
        registry.disconnect(a);
        assert_eq!(registry.roster(), vec!["User2".to_string()]);

        let (nickname, _) = registry.connect(SessionId::new());
        assert_eq!(nickname, "User3");
    }

    #[test]
    fn test_nickname_lookup() {
        let mut registry = SessionRegistry::new();
        let a = SessionId::new();
        registry.connect(a);

        assert_eq!(registry.nickname_of(a), Some("User1"));
        assert_eq!(registry.nickname_of(SessionId::new()), None);

        registry.disconnect(a);
        assert_eq!(registry.nickname_of(a), None);
    }

    #[test]
    fn test_roster_preserves_insertion_order() {
        let mut registry = SessionRegistry::new();
        let ids: Vec<SessionId> = (0..4).map(|_| SessionId::new()).collect();
        for &id in &ids {
            registry.connect(id);
        }
        registry.disconnect(ids[1]);

        assert_eq!(
            registry.roster(),
            vec!["User1".to_string(), "User3".to_string(), "User4".to_string()]
        );
    }
}

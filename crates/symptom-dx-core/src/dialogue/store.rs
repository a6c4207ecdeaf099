//! In-memory conversation store with per-user locking.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::models::ConversationState;

/// Conversation state keyed by an opaque user identifier.
///
/// Each conversation sits behind its own mutex, so turns for one user are
/// serialized while other users proceed in parallel. State lives until
/// [`ConversationStore::reset`] or the store is dropped.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: DashMap<String, Arc<Mutex<ConversationState>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to a user's state, creating it on first use.
    ///
    /// If the conversation is reset while this call waits for the lock, the
    /// turn runs against a fresh conversation rather than the dropped one.
    pub fn with_state<R>(&self, user_id: &str, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        loop {
            // Clone the handle so the map shard is released before locking.
            let handle = self.handle(user_id);
            let mut state = handle.lock();
            if self.is_current(user_id, &handle) {
                return f(&mut state);
            }
        }
    }

    /// Copy of a user's state, if the user has spoken.
    pub fn snapshot(&self, user_id: &str) -> Option<ConversationState> {
        let handle = self.conversations.get(user_id)?.value().clone();
        let state = handle.lock().clone();
        Some(state)
    }

    /// Clear a user's diagnosis log. Returns false for unknown users.
    pub fn clear_log(&self, user_id: &str) -> bool {
        let Some(handle) = self.conversations.get(user_id).map(|e| e.value().clone()) else {
            return false;
        };
        handle.lock().diagnosis_log.clear();
        true
    }

    /// Drop a user's conversation entirely.
    ///
    /// Waits for an in-flight turn to finish, so the turn is never applied to
    /// a conversation that was already removed.
    pub fn reset(&self, user_id: &str) -> bool {
        let Some(handle) = self.conversations.get(user_id).map(|e| e.value().clone()) else {
            return false;
        };
        let _state = handle.lock();
        let removed = self
            .conversations
            .remove_if(user_id, |_, current| Arc::ptr_eq(current, &handle));
        removed.is_some()
    }

    /// Number of tracked conversations.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn is_current(&self, user_id: &str, handle: &Arc<Mutex<ConversationState>>) -> bool {
        self.conversations
            .get(user_id)
            .is_some_and(|e| Arc::ptr_eq(e.value(), handle))
    }

    fn handle(&self, user_id: &str) -> Arc<Mutex<ConversationState>> {
        self.conversations
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone()
    }
}

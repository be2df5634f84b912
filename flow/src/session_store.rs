//! In-memory session store keyed by conversation.

use coinswap_common::{ConversationId, TradingSession};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Holds one [`TradingSession`] per conversation.
///
/// Sessions are copied out and written back whole; a handler never holds a
/// map guard across an await point. Handlers that read, await and write back
/// take the conversation's turn first with [`SessionStore::lock`].
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<ConversationId, TradingSession>,
    turns: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other handler is working on `conversation`.
    ///
    /// The guard keeps the turn until dropped; messages of one conversation
    /// are handled one at a time, in arrival order.
    pub async fn lock(&self, conversation: ConversationId) -> OwnedMutexGuard<()> {
        let turn = self.turns.entry(conversation).or_default().value().clone();
        turn.lock_owned().await
    }

    /// Current session, or an empty one if the conversation has none.
    pub fn get(&self, conversation: ConversationId) -> TradingSession {
        self.sessions
            .get(&conversation)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Replace the session for a conversation.
    pub fn put(&self, conversation: ConversationId, session: TradingSession) {
        self.sessions.insert(conversation, session);
    }

    /// Apply `f` to the stored session and store the result.
    pub fn update<F>(&self, conversation: ConversationId, f: F) -> TradingSession
    where
        F: FnOnce(TradingSession) -> TradingSession,
    {
        let mut entry = self.sessions.entry(conversation).or_default();
        let next = f(std::mem::take(entry.value_mut()));
        *entry.value_mut() = next.clone();
        next
    }

    /// Discard the session; the conversation starts over.
    pub fn reset(&self, conversation: ConversationId) {
        self.sessions.remove(&conversation);
    }

    /// Number of conversations with a session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! Process-local session store keyed by Telegram user id.
//!
//! Each user gets an independent `Arc<Mutex<ConversationState>>`. The outer
//! map lock is held only to look up, insert or prune an entry, so distinct
//! users never wait on each other. Holding a user's [`SessionGuard`]
//! serialises that user's events, including the delivery that follows the
//! last step.
//!
//! Entries are pruned by [`SessionStore::release`] once they are back to
//! empty and no event holds or awaits them, so the map only keeps users
//! with a flow in progress. There is no TTL: abandoned flows stay in memory
//! until the user sends `/start` again or the process restarts.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::flow::ConversationState;

/// Telegram user id.
pub type UserId = i64;

/// Exclusive access to one user's conversation state.
pub type SessionGuard = OwnedMutexGuard<ConversationState>;

/// Maps users to their conversation state, creating it on first contact.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Arc<Mutex<ConversationState>>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state of `user_id` for the duration of one event.
    ///
    /// Waits while another event from the same user is being processed.
    pub async fn lock(&self, user_id: UserId) -> SessionGuard {
        let entry = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_id).or_default())
        };
        entry.lock_owned().await
    }

    /// Snapshot of the current state of `user_id`.
    pub async fn get(&self, user_id: UserId) -> ConversationState {
        let entry = self.sessions.lock().await.get(&user_id).cloned();
        match entry {
            Some(entry) => entry.lock().await.clone(),
            None => ConversationState::default(),
        }
    }

    /// Clear the state of `user_id` back to empty and drop its entry.
    pub async fn reset(&self, user_id: UserId) {
        let entry = self.sessions.lock().await.get(&user_id).cloned();
        if let Some(entry) = entry {
            *entry.lock().await = ConversationState::default();
        }
        self.release(user_id).await;
    }

    /// Number of users with a stored conversation.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop the entry of `user_id` if its state is empty and no event holds
    /// or is waiting on it.
    ///
    /// Call after the event's [`SessionGuard`] has been dropped.
    pub async fn release(&self, user_id: UserId) {
        let mut sessions = self.sessions.lock().await;
        let Some(entry) = sessions.get(&user_id) else {
            return;
        };
        // New clones are only handed out under the map lock held here.
        if Arc::strong_count(entry) != 1 {
            return;
        }
        let idle = entry.try_lock().is_ok_and(|state| state.is_empty());
        if idle {
            sessions.remove(&user_id);
        }
    }
}

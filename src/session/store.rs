//! Conversation-keyed store with one writer per key
//!
//! The outer map lock is held only long enough to find or create an entry.
//! Each entry has its own async mutex, held for the whole turn, so duplicate
//! deliveries for one identifier are serialized while different identifiers
//! never contend.

use super::ConversationState;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type Entry = Arc<Mutex<ConversationState>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the conversation for `id`, creating it on first use.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<ConversationState> {
        let existing = self.sessions.read().await.get(id).cloned();
        let entry = match existing {
            Some(entry) => entry,
            None => {
                let mut sessions = self.sessions.write().await;
                Arc::clone(sessions.entry(id.to_string()).or_insert_with(|| {
                    tracing::debug!(conversation_id = %id, "Creating conversation");
                    Arc::new(Mutex::new(ConversationState::new(id)))
                }))
            }
        };
        entry.lock_owned().await
    }

    /// Drop conversations whose last activity is older than `ttl`.
    ///
    /// A conversation that never completed a turn ages from its creation.
    /// Conversations locked by an in-flight turn are kept.
    pub async fn prune_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.try_lock() {
            Ok(state) => {
                let last = state.last_activity_at.unwrap_or(state.created_at);
                now.signed_duration_since(last) <= ttl
            }
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

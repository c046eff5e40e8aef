//! Per-conversation state
//!
//! One `ConversationState` exists per end-user identifier. It is created
//! lazily on the first message and lives in memory until the process exits,
//! the conversation is reset, or the store evicts it after a long silence.

pub mod slots;
mod store;

pub use slots::{merge, Slot, Slots};
pub use store::SessionStore;

use crate::nlu::{Intent, Language};
use crate::search::Venue;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Step of a turn that is waiting on an external lookup.
///
/// Always `Idle` between turns; the other variants only exist while a turn
/// is in flight on a snapshot of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Idle,
    Locating { intent: Intent },
    Searching { intent: Intent },
}

/// Mutable record for one conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    pub id: String,
    pub slots: Slots,
    /// Last intent that produced a result list
    pub last_intent_satisfied: Option<Intent>,
    /// Slot the next message is expected to fill
    pub pending_question: Option<Slot>,
    /// Slots the user moved past without answering; not asked again until reset
    pub skipped: BTreeSet<Slot>,
    /// Venues shown most recently, in display order
    pub last_results: Vec<Venue>,
    pub language: Language,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// When the store first created this conversation
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub phase: TurnPhase,
}

impl ConversationState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slots: Slots::default(),
            last_intent_satisfied: None,
            pending_question: None,
            skipped: BTreeSet::new(),
            last_results: Vec::new(),
            language: Language::default(),
            last_activity_at: None,
            created_at: Utc::now(),
            phase: TurnPhase::Idle,
        }
    }

    /// Clear all slots and routing metadata. Identity and language survive.
    pub fn reset(&mut self) {
        self.slots = Slots::default();
        self.last_intent_satisfied = None;
        self.pending_question = None;
        self.skipped.clear();
        self.last_results.clear();
        self.phase = TurnPhase::Idle;
    }

    /// Apply non-empty values from `updates`
    pub fn apply(&mut self, updates: &Slots) {
        self.slots = merge(&self.slots, updates);
    }

    /// True when there was prior activity and it is older than `threshold`.
    /// A conversation that has never been active is not idle.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.last_activity_at
            .is_some_and(|last| now.signed_duration_since(last) > threshold)
    }
}

//! Structured outcome of a turn, consumed by the reply renderer

use crate::search::Venue;
use crate::session::Slot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    Photos,
    Dishes,
}

/// A clarifying question. A decision carries at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Slot(Slot),
    WhichPlace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// Fresh greeting, optionally asking for the first missing slot
    Greet { ask: Option<Slot> },
    /// Conversation cleared; always asks for the locality
    ResetDone,
    AskSlot { slot: Slot },
    /// Locality could not be geocoded; asks for a narrower sub-area
    CannotLocate { locality: String, sub_area: String },
    /// Search came back empty; asks for a sub-area or a different cuisine
    Nudge {
        locality: String,
        cuisine: String,
        ask: Slot,
    },
    Results {
        venues: Vec<Venue>,
        ask: Option<Slot>,
    },
    VenueFollowUp { kind: FollowUpKind, venue: Venue },
    AskWhichPlace { kind: FollowUpKind },
    TechnicalHiccup,
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Greet { .. } => "greet",
            Decision::ResetDone => "reset_done",
            Decision::AskSlot { .. } => "ask_slot",
            Decision::CannotLocate { .. } => "cannot_locate",
            Decision::Nudge { .. } => "nudge",
            Decision::Results { .. } => "results",
            Decision::VenueFollowUp { .. } => "venue_follow_up",
            Decision::AskWhichPlace { .. } => "ask_which_place",
            Decision::TechnicalHiccup => "technical_hiccup",
        }
    }

    /// The single question this decision asks, if any
    pub fn question(&self) -> Option<Question> {
        match self {
            Decision::Greet { ask } | Decision::Results { ask, .. } => ask.map(Question::Slot),
            Decision::ResetDone => Some(Question::Slot(Slot::Locality)),
            Decision::AskSlot { slot } => Some(Question::Slot(*slot)),
            Decision::CannotLocate { .. } => Some(Question::Slot(Slot::SubArea)),
            Decision::Nudge { ask, .. } => Some(Question::Slot(*ask)),
            Decision::AskWhichPlace { .. } => Some(Question::WhichPlace),
            Decision::VenueFollowUp { .. } | Decision::TechnicalHiccup => None,
        }
    }

    /// Slot the next message is expected to fill
    pub fn awaited_slot(&self) -> Option<Slot> {
        match self.question() {
            Some(Question::Slot(slot)) => Some(slot),
            _ => None,
        }
    }
}

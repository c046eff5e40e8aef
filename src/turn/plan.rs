//! Pure turn transitions
//!
//! `transition` never performs I/O. Lookups the turn needs are returned as
//! effects; the controller executes them and feeds the outcome back in as the
//! next event.

use super::decision::{Decision, FollowUpKind};
use crate::geo::Resolution;
use crate::nlu::fold::fold;
use crate::nlu::{pick_language, Analysis, Intent};
use crate::search::{SearchRequest, Venue};
use crate::session::slots::normalize;
use crate::session::{ConversationState, Slot, Slots, TurnPhase};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Order in which missing slots are asked once a locality is known
const FOLLOW_UP_ORDER: [Slot; 3] = [Slot::SubArea, Slot::Cuisine, Slot::Budget];

/// Minimum folded length of a venue reference for name matching
const MIN_REFERENCE_LEN: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct TurnContext {
    pub now: DateTime<Utc>,
    /// Silence after which the next message starts a fresh conversation
    pub idle_after: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message {
        text: String,
        display_name: String,
        /// Slot values supplied alongside the message by the caller
        presupplied: Slots,
        analysis: Analysis,
    },
    Located(Resolution),
    Searched(Vec<Venue>),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Message { .. } => "message",
            Event::Located(_) => "located",
            Event::Searched(_) => "searched",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Locate { locality: String, sub_area: String },
    Search(SearchRequest),
    /// Terminal: the turn is complete
    Reply(Decision),
}

#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effect: Effect,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("a turn is already in progress ({0:?})")]
    Busy(TurnPhase),
    #[error("unexpected {event} event while {phase:?}")]
    Unexpected {
        event: &'static str,
        phase: TurnPhase,
    },
}

pub fn transition(
    state: &ConversationState,
    context: &TurnContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        (
            TurnPhase::Idle,
            Event::Message {
                text,
                display_name,
                presupplied,
                analysis,
            },
        ) => Ok(on_message(
            state,
            context,
            &text,
            &display_name,
            &presupplied,
            analysis,
        )),
        (phase, Event::Message { .. }) => Err(TransitionError::Busy(phase)),

        (TurnPhase::Locating { intent }, Event::Located(resolution)) => {
            Ok(on_located(state, intent, resolution))
        }
        (TurnPhase::Searching { intent }, Event::Searched(venues)) => {
            Ok(on_searched(state, intent, venues))
        }
        (phase, event) => Err(TransitionError::Unexpected {
            event: event.name(),
            phase,
        }),
    }
}

fn reply(mut state: ConversationState, decision: Decision) -> TransitionResult {
    state.pending_question = decision.awaited_slot();
    state.phase = TurnPhase::Idle;
    TransitionResult {
        new_state: state,
        effect: Effect::Reply(decision),
    }
}

/// Next slot worth asking once a locality is known: not answered, not skipped.
pub fn next_slot_to_ask(state: &ConversationState) -> Option<Slot> {
    FOLLOW_UP_ORDER
        .into_iter()
        .find(|slot| !state.slots.is_filled(*slot) && !state.skipped.contains(slot))
}

fn first_missing(state: &ConversationState) -> Option<Slot> {
    if state.slots.locality.is_empty() {
        Some(Slot::Locality)
    } else {
        next_slot_to_ask(state)
    }
}

fn on_message(
    state: &ConversationState,
    context: &TurnContext,
    text: &str,
    display_name: &str,
    presupplied: &Slots,
    mut analysis: Analysis,
) -> TransitionResult {
    let mut next = state.clone();
    next.language = pick_language(state.language, text, display_name);
    next.last_activity_at = Some(context.now);

    if analysis.intent == Intent::Reset {
        next.reset();
        return reply(next, Decision::ResetDone);
    }

    if state.is_idle(context.now, context.idle_after) {
        next.reset();
        next.apply(presupplied);
        next.apply(&analysis.updates);
        let ask = first_missing(&next);
        return reply(next, Decision::Greet { ask });
    }

    let asked = state.pending_question;
    next.apply(presupplied);

    // A bare answer fills the open question when it fits that slot; otherwise,
    // with a known locality, it names a sub-area.
    if analysis.intent == Intent::Unknown && analysis.short_reply && !analysis.declined {
        let target = asked
            .filter(|slot| !normalize(*slot, text).is_empty())
            .or_else(|| next.slots.is_filled(Slot::Locality).then_some(Slot::SubArea));
        if let Some(slot) = target {
            analysis.updates.set(slot, text.trim());
            analysis.intent = if slot == Slot::Locality {
                Intent::NewLocality
            } else {
                Intent::UpdateSlot
            };
        }
    }

    let previous_locality = fold(&next.slots.locality);
    let updates = &analysis.updates;
    next.apply(updates);
    let moved = !previous_locality.is_empty()
        && !updates.locality.is_empty()
        && fold(updates.locality.trim()) != previous_locality;
    if moved && updates.sub_area.is_empty() && presupplied.sub_area.is_empty() {
        next.slots.sub_area.clear();
        next.last_results.clear();
    }

    if let Some(slot) = asked {
        if slot != Slot::Locality && (analysis.declined || !next.slots.is_filled(slot)) {
            next.skipped.insert(slot);
        }
    }
    next.pending_question = None;

    match analysis.intent {
        Intent::PhotoRequest => follow_up(next, FollowUpKind::Photos, text, &analysis),
        Intent::DishInquiry => follow_up(next, FollowUpKind::Dishes, text, &analysis),
        intent if intent.is_search() => locate_or_ask(next, intent),
        Intent::Chitchat => {
            let ask = first_missing(&next);
            reply(next, Decision::Greet { ask })
        }
        _ => {
            if next.slots.locality.is_empty() {
                return reply(
                    next,
                    Decision::Greet {
                        ask: Some(Slot::Locality),
                    },
                );
            }
            match next_slot_to_ask(&next) {
                Some(slot) => reply(next, Decision::AskSlot { slot }),
                None => locate_or_ask(next, Intent::Recommend),
            }
        }
    }
}

fn locate_or_ask(mut next: ConversationState, intent: Intent) -> TransitionResult {
    if next.slots.locality.is_empty() {
        return reply(
            next,
            Decision::AskSlot {
                slot: Slot::Locality,
            },
        );
    }
    next.phase = TurnPhase::Locating { intent };
    let effect = Effect::Locate {
        locality: next.slots.locality.clone(),
        sub_area: next.slots.sub_area.clone(),
    };
    TransitionResult {
        new_state: next,
        effect,
    }
}

/// Venue a follow-up refers to: by name first, then by a deictic pointer to
/// the top result.
fn find_referent<'a>(results: &'a [Venue], text: &str, analysis: &Analysis) -> Option<&'a Venue> {
    let message = fold(text);
    let reference = fold(analysis.place_reference.trim());

    let by_name = results.iter().find(|venue| {
        let name = fold(venue.name.trim());
        if name.chars().count() < MIN_REFERENCE_LEN {
            return false;
        }
        message.contains(&name)
            || (reference.chars().count() >= MIN_REFERENCE_LEN
                && (name.contains(&reference) || reference.contains(&name)))
    });

    by_name.or_else(|| analysis.deictic.then(|| results.first()).flatten())
}

fn follow_up(
    next: ConversationState,
    kind: FollowUpKind,
    text: &str,
    analysis: &Analysis,
) -> TransitionResult {
    match find_referent(&next.last_results, text, analysis).cloned() {
        Some(venue) => reply(next, Decision::VenueFollowUp { kind, venue }),
        None => reply(next, Decision::AskWhichPlace { kind }),
    }
}

fn on_located(state: &ConversationState, intent: Intent, resolution: Resolution) -> TransitionResult {
    let mut next = state.clone();
    match resolution {
        Resolution::NotFound => {
            let decision = Decision::CannotLocate {
                locality: next.slots.locality.clone(),
                sub_area: next.slots.sub_area.clone(),
            };
            reply(next, decision)
        }
        Resolution::Found(center) => {
            next.phase = TurnPhase::Searching { intent };
            let effect = Effect::Search(SearchRequest {
                center,
                cuisine: next.slots.cuisine.clone(),
                sub_area_given: next.slots.is_filled(Slot::SubArea),
            });
            TransitionResult {
                new_state: next,
                effect,
            }
        }
    }
}

fn on_searched(state: &ConversationState, intent: Intent, venues: Vec<Venue>) -> TransitionResult {
    let mut next = state.clone();
    if venues.is_empty() {
        let ask = if next.slots.is_filled(Slot::SubArea) {
            Slot::Cuisine
        } else {
            Slot::SubArea
        };
        let decision = Decision::Nudge {
            locality: next.slots.locality.clone(),
            cuisine: next.slots.cuisine.clone(),
            ask,
        };
        return reply(next, decision);
    }

    next.last_results = venues.clone();
    next.last_intent_satisfied = Some(intent);
    let ask = next_slot_to_ask(&next);
    reply(next, Decision::Results { venues, ask })
}

//! Turn handling
//!
//! Elm-style split: `plan::transition` is a pure function from
//! (state, event) to (state, effect); `controller` executes the effects
//! against the resolver and search engine and feeds results back as events.

mod controller;
mod decision;
mod plan;

pub use controller::{Concierge, TurnController, TurnInput};
pub use decision::{Decision, FollowUpKind, Question};

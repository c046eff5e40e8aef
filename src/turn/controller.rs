//! Effect execution and per-conversation turn handling

use super::decision::Decision;
use super::plan::{transition, Effect, Event, TransitionError, TurnContext};
use crate::geo::LocalityResolver;
use crate::nlu::{analyze, NluService};
use crate::search::SearchEngine;
use crate::session::{ConversationState, SessionStore, Slots};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

/// Upper bound on transitions in one turn (message, located, searched)
const MAX_STEPS: usize = 8;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("turn did not settle after {0} steps")]
    StepLimit(usize),
    #[error("turn task failed: {0}")]
    Task(String),
}

/// One inbound message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnInput {
    pub message: String,
    pub display_name: String,
    pub presupplied: Slots,
}

/// Runs a turn's transitions and executes the effects they request.
pub struct TurnController {
    resolver: LocalityResolver,
    engine: SearchEngine,
    nlu: Option<Arc<dyn NluService>>,
    idle_after: Duration,
}

impl TurnController {
    pub fn new(
        resolver: LocalityResolver,
        engine: SearchEngine,
        nlu: Option<Arc<dyn NluService>>,
        idle_after: Duration,
    ) -> Self {
        Self {
            resolver,
            engine,
            nlu,
            idle_after,
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Drive `state` through one message. The state is only meaningful when
    /// this returns `Ok`.
    pub async fn run(
        &self,
        mut state: ConversationState,
        input: TurnInput,
        now: DateTime<Utc>,
    ) -> Result<(ConversationState, Decision), TurnError> {
        let context = TurnContext {
            now,
            idle_after: self.idle_after,
        };

        let mut analysis = analyze(&input.message);
        if let Some(nlu) = &self.nlu {
            if !input.message.trim().is_empty() {
                match nlu.interpret(&input.message, &state.slots).await {
                    Ok(hints) => analysis.absorb(&hints),
                    Err(e) => tracing::warn!(error = %e, "NLU hints unavailable; using patterns only"),
                }
            }
        }
        tracing::debug!(intent = %analysis.intent, "Message analysed");

        let mut event = Event::Message {
            text: input.message,
            display_name: input.display_name,
            presupplied: input.presupplied,
            analysis,
        };

        for _ in 0..MAX_STEPS {
            let result = transition(&state, &context, event)?;
            state = result.new_state;
            event = match result.effect {
                Effect::Reply(decision) => {
                    tracing::info!(decision = decision.kind(), "Turn settled");
                    return Ok((state, decision));
                }
                Effect::Locate { locality, sub_area } => {
                    Event::Located(self.resolver.resolve(&locality, &sub_area).await)
                }
                Effect::Search(request) => Event::Searched(self.engine.search(&request).await),
            };
        }
        Err(TurnError::StepLimit(MAX_STEPS))
    }
}

/// Result of a handled turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub decision: Decision,
    /// Conversation state after the turn (unchanged when the turn failed)
    pub state: ConversationState,
}

/// Serializes turns per conversation and isolates their failures.
///
/// Each turn runs on a snapshot in its own task. The snapshot is committed
/// only when the turn succeeds, so a failed or panicked turn leaves the
/// stored conversation exactly as it was.
pub struct Concierge {
    store: Arc<SessionStore>,
    controller: Arc<TurnController>,
}

impl Concierge {
    pub fn new(store: Arc<SessionStore>, controller: Arc<TurnController>) -> Self {
        Self { store, controller }
    }

    #[cfg(test)]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn controller(&self) -> &Arc<TurnController> {
        &self.controller
    }

    pub async fn handle(&self, conversation_id: &str, input: TurnInput) -> TurnOutcome {
        let span = tracing::info_span!(
            "turn",
            conversation_id = %conversation_id,
            turn_id = %Uuid::new_v4()
        );
        self.handle_inner(conversation_id, input)
            .instrument(span)
            .await
    }

    async fn handle_inner(&self, conversation_id: &str, input: TurnInput) -> TurnOutcome {
        let start = std::time::Instant::now();
        let mut guard = self.store.acquire(conversation_id).await;
        let snapshot = guard.clone();
        let controller = Arc::clone(&self.controller);

        let task = tokio::spawn(
            async move { controller.run(snapshot, input, Utc::now()).await }
                .in_current_span(),
        );
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(TurnError::Task(e.to_string())),
        };

        match result {
            Ok((state, decision)) => {
                *guard = state;
                tracing::info!(duration_ms = %start.elapsed().as_millis(), "Turn completed");
                TurnOutcome {
                    decision,
                    state: guard.clone(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed; state left untouched");
                TurnOutcome {
                    decision: Decision::TechnicalHiccup,
                    state: guard.clone(),
                }
            }
        }
    }
}

//! LLM-assisted slot hints
//!
//! A remote chat model is asked for the same slot fields the pattern
//! extractor produces. Its answers only fill gaps; pattern matches always win.

use super::Intent;
use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService};
use crate::session::Slots;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const NLU_PROMPT: &str = r#"Return ONLY a JSON object:
{"updates":{"city":"","zone":"","cuisine":"","budget":""},"intent":"recommend|update|reset|chitchat|unknown"}
- "olvida/reinicia/start over" => intent=reset
- "hola/hello/hi" => chitchat
- "estoy en X / en X / I'm in X" => city
- "zona/colonia/neighborhood X" => zone
- "tengo antojo de/quiero/se me antoja/craving X" => cuisine
- "$300 / 300 pesos" => budget (digits only)
- "sorpréndeme/recomiéndame/surprise me" => intent=recommend
Leave a field empty when the message does not mention it."#;

const NLU_TIMEOUT: Duration = Duration::from_secs(4);

/// Slot and intent hints from a remote model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NluHints {
    pub updates: Slots,
    pub intent: Option<Intent>,
}

#[async_trait]
pub trait NluService: Send + Sync {
    async fn interpret(&self, message: &str, slots: &Slots) -> Result<NluHints, LlmError>;
}

/// NLU backed by a chat-completion model
pub struct LlmNlu {
    llm: Arc<dyn LlmService>,
}

impl LlmNlu {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl NluService for LlmNlu {
    async fn interpret(&self, message: &str, slots: &Slots) -> Result<NluHints, LlmError> {
        let previous = serde_json::to_string(slots).unwrap_or_default();
        let request = LlmRequest {
            system: NLU_PROMPT.to_string(),
            messages: vec![LlmMessage::user(format!(
                "msg: \"\"\"{message}\"\"\"\nprev: {previous}"
            ))],
            max_tokens: Some(200),
            temperature: Some(0.0),
            json_output: true,
        };

        let response = timeout(NLU_TIMEOUT, self.llm.complete(&request))
            .await
            .map_err(|_| LlmError::timeout("NLU request timed out"))??;

        parse_hints(&response.text)
    }
}

#[derive(Debug, Deserialize)]
struct RawHints {
    #[serde(default)]
    updates: Slots,
    #[serde(default)]
    intent: String,
}

/// Parse the model's JSON answer. Code fences around the object are tolerated.
pub fn parse_hints(text: &str) -> Result<NluHints, LlmError> {
    let body = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let raw: RawHints = serde_json::from_str(body)
        .map_err(|e| LlmError::malformed(format!("NLU answer is not valid JSON: {e}")))?;

    let intent = match raw.intent.trim() {
        "recommend" => Some(Intent::Recommend),
        "update" | "update_slot" => Some(Intent::UpdateSlot),
        "reset" => Some(Intent::Reset),
        "chitchat" => Some(Intent::Chitchat),
        _ => None,
    };

    Ok(NluHints {
        updates: raw.updates,
        intent,
    })
}

//! API request and response types

use crate::nlu::Language;
use crate::session::slots::lenient_text;
use crate::session::Slots;
use serde::{Deserialize, Serialize};

/// One inbound chat message
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default, alias = "manychat_user_id")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Display name; only used as a language hint
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "locality", deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(default, alias = "sub_area", deserialize_with = "lenient_text")]
    pub zone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cuisine: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub budget: String,
    /// Nested slot values; these override the flat fields
    #[serde(default)]
    pub slots: Option<Slots>,
}

impl RecommendationRequest {
    /// Trimmed conversation id, if one was sent
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Slot values carried by the request itself
    pub fn presupplied(&self) -> Slots {
        let flat = Slots {
            locality: self.city.clone(),
            sub_area: self.zone.clone(),
            cuisine: self.cuisine.clone(),
            budget: self.budget.clone(),
        };
        let slots = Slots::default().merged(&flat);
        match &self.slots {
            Some(nested) => slots.merged(nested),
            None => slots,
        }
    }
}

/// Reply for one turn
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub reply: String,
    /// The single clarifying question, empty when none
    pub followup: String,
    pub slots: Slots,
    /// Slot the next message is expected to fill
    pub next_slot: Option<&'static str>,
    pub language: Language,
    /// Decision kind, for client-side analytics
    pub decision: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub dataset_records: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_slots_override_flat_fields() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{"manychat_user_id":"42","city":"Guadalajara","zone":"Chapultepec",
                "slots":{"city":"CDMX","cuisine":"ramen"}}"#,
        )
        .unwrap();
        assert_eq!(request.conversation_id(), Some("42"));
        let slots = request.presupplied();
        assert_eq!(slots.locality, "CDMX");
        assert_eq!(slots.sub_area, "Chapultepec");
        assert_eq!(slots.cuisine, "ramen");
    }

    #[test]
    fn test_numeric_budget_flat_and_nested() {
        let flat: RecommendationRequest =
            serde_json::from_str(r#"{"manychat_user_id":"1","budget":300}"#).unwrap();
        assert_eq!(flat.presupplied().budget, "300");

        let nested: RecommendationRequest =
            serde_json::from_str(r#"{"manychat_user_id":"1","slots":{"budget":450}}"#).unwrap();
        assert_eq!(nested.presupplied().budget, "450");
    }

    #[test]
    fn test_blank_conversation_id_is_missing() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"conversation_id":"  ","message":"hola"}"#).unwrap();
        assert_eq!(request.conversation_id(), None);
    }

    #[test]
    fn test_flat_budget_is_normalized() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"conversation_id":"1","budget":"$350 MXN"}"#).unwrap();
        assert_eq!(request.presupplied().budget, "350");
    }
}

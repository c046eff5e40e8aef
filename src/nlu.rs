//! Message understanding: pattern extraction, intent routing, language
//!
//! Extraction and routing are stateless functions over the raw message. The
//! optional LLM hints are merged in afterwards and never override a pattern
//! match.

pub mod extract;
pub mod fold;
mod hints;
pub mod intent;
mod language;

pub use hints::{LlmNlu, NluHints, NluService};
pub use intent::{classify, Intent};
pub use language::{detect_language, pick_language, Language};

use crate::session::{Slot, Slots};
use regex::Regex;
use std::sync::LazyLock;

static DECLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:m+\s+)?(?:no|nop|nel|no se|ni idea|ningun[ao]?|cualquiera|da igual|me da igual|lo que sea|none|nope|no idea|any|anything|whatever|doesn'?t matter|skip)$",
    )
    .expect("decline pattern is valid")
});

/// Everything the turn controller learns from one message
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub intent: Intent,
    pub updates: Slots,
    /// Trailing venue reference ("at X"), for follow-up questions
    pub place_reference: String,
    /// Message points at a shown venue without naming it
    pub deictic: bool,
    /// Message is a short plain-text reply (a bare place or cuisine name)
    pub short_reply: bool,
    /// Message declines the pending question ("no sé", "whatever")
    pub declined: bool,
}

/// Run extraction and routing over a message
pub fn analyze(message: &str) -> Analysis {
    let updates = extract::extract(message);
    let intent = classify(message, &updates);
    let folded = fold::fold(message);
    Analysis {
        intent,
        updates,
        place_reference: extract::extract_place_reference(message),
        deictic: extract::is_deictic(&folded),
        short_reply: is_short_reply(message),
        declined: DECLINE.is_match(folded.trim().trim_end_matches(['.', '!'])),
    }
}

/// At most four words of letters, spaces and name punctuation
pub fn is_short_reply(message: &str) -> bool {
    let trimmed = message.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= 40
        && trimmed.split_whitespace().count() <= 4
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '-'))
}

impl Analysis {
    /// Fill gaps from LLM hints. Pattern values always win, and the model may
    /// only upgrade an `unknown` classification to a non-destructive intent.
    pub fn absorb(&mut self, hints: &NluHints) {
        for slot in Slot::ALL {
            if self.updates.get(slot).is_empty() {
                let hinted = hints.updates.get(slot).trim();
                if !hinted.is_empty() {
                    self.updates.set(slot, hinted);
                }
            }
        }
        if self.intent == Intent::Unknown {
            if let Some(hinted @ (Intent::Recommend | Intent::UpdateSlot | Intent::Chitchat)) =
                hints.intent
            {
                self.intent = hinted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_combines_fields() {
        let analysis = analyze("estoy en CDMX, zona Roma, quiero ramen de 300");
        assert_eq!(analysis.intent, Intent::NewLocality);
        assert_eq!(analysis.updates.locality, "CDMX");
        assert_eq!(analysis.updates.sub_area, "Roma");
        assert_eq!(analysis.updates.cuisine, "ramen");
        assert_eq!(analysis.updates.budget, "300");
        assert!(!analysis.short_reply);
    }

    #[test]
    fn test_short_reply() {
        assert!(is_short_reply("Roma"));
        assert!(is_short_reply("Del Valle Centro"));
        assert!(!is_short_reply("¿Roma?"));
        assert!(!is_short_reply("quiero algo rico cerca de aquí por favor"));
        assert!(!is_short_reply("   "));
    }

    #[test]
    fn test_declined() {
        assert!(analyze("mmm no sé").declined);
        assert!(analyze("Whatever!").declined);
        assert!(!analyze("Roma").declined);
    }

    #[test]
    fn test_absorb_fills_only_gaps() {
        let mut analysis = analyze("quiero ramen");
        analysis.absorb(&NluHints {
            updates: Slots {
                locality: "Puebla".into(),
                cuisine: "pho".into(),
                ..Slots::default()
            },
            intent: Some(Intent::Chitchat),
        });
        assert_eq!(analysis.updates.locality, "Puebla");
        assert_eq!(analysis.updates.cuisine, "ramen");
        assert_eq!(analysis.intent, Intent::Recommend);
    }

    #[test]
    fn test_absorb_never_upgrades_to_reset() {
        let mut analysis = analyze("mmm no sé");
        assert_eq!(analysis.intent, Intent::Unknown);
        analysis.absorb(&NluHints {
            updates: Slots::default(),
            intent: Some(Intent::Reset),
        });
        assert_eq!(analysis.intent, Intent::Unknown);

        analysis.absorb(&NluHints {
            updates: Slots::default(),
            intent: Some(Intent::Recommend),
        });
        assert_eq!(analysis.intent, Intent::Recommend);
    }
}

//! Reply language heuristics

use super::fold::fold;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SPANISH_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[áéíóúñü¿¡]").expect("valid pattern"));

static SPANISH_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:hola|buenas|ciudad|zona|colonia|antojo|antoja|presupuesto|quiero|estoy|donde|comida|olvida|gracias|por favor|que onda|cdmx|mexico|recomiendame|sorprendeme|tengo|algo|pesos)\b",
    )
    .expect("valid pattern")
});

static ENGLISH_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:hello|hi|hey|i'm|i am|want|craving|where|food|please|thanks|reset|neighborhood|neighbourhood|budget|what|recommend|surprise|photos?|pictures?|order|near|city)\b",
    )
    .expect("valid pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

/// Language signalled by `text`, or `None` when the signal is ambiguous
pub fn detect_language(text: &str) -> Option<Language> {
    let lower = text.to_lowercase();
    if SPANISH_MARKS.is_match(&lower) {
        return Some(Language::Es);
    }
    let folded = fold(text);
    let spanish = SPANISH_WORDS.find_iter(&folded).count();
    let english = ENGLISH_WORDS.find_iter(&folded).count();
    match spanish.cmp(&english) {
        std::cmp::Ordering::Greater => Some(Language::Es),
        std::cmp::Ordering::Less => Some(Language::En),
        std::cmp::Ordering::Equal => None,
    }
}

/// Sticky language choice: keep `current` unless the message (or, for an
/// empty message, the display name) gives a clear signal.
pub fn pick_language(current: Language, message: &str, display_name: &str) -> Language {
    let source = if message.trim().is_empty() {
        display_name
    } else {
        message
    };
    detect_language(source).unwrap_or(current)
}

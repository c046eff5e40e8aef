//! Priority-ordered intent classification
//!
//! Rules are evaluated in a fixed order and the first match wins. Resets and
//! locality changes come before cuisine mentions because one message can
//! contain both; photo and dish follow-ups come before `recommend` so they
//! are not absorbed into a fresh search.

use super::fold::fold;
use crate::session::Slots;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Reset,
    NewLocality,
    PhotoRequest,
    DishInquiry,
    Recommend,
    UpdateSlot,
    Chitchat,
    Unknown,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Reset => "reset",
            Intent::NewLocality => "new_locality",
            Intent::PhotoRequest => "photo_request",
            Intent::DishInquiry => "dish_inquiry",
            Intent::Recommend => "recommend",
            Intent::UpdateSlot => "update_slot",
            Intent::Chitchat => "chitchat",
            Intent::Unknown => "unknown",
        }
    }

    /// Intents that lead to a locality lookup and search
    pub fn is_search(self) -> bool {
        matches!(
            self,
            Intent::NewLocality | Intent::Recommend | Intent::UpdateSlot
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("intent pattern is valid")
}

static RESET: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\bolvid|\breinici|\bempecemos de nuevo\b|\bempezar de nuevo\b|\bde cero\b|\bborra todo\b|\breset\b|\bstart over\b|\brestart\b|\bforget\b",
    )
});

static PHOTO: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\bfotos?\b|\bphotos?\b|\bpictures?\b|\bpics?\b|\bimagen(?:es)?\b|\bmenu\b|\bla carta\b")
});

static DISH: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?:que|what)\s+(?:\w+\s+){0,3}?(?:pido|pedir|ordeno|ordenar|order)\b|\b(?:que es lo bueno|what(?:'s| is) good)\s+(?:en|at|there|ahi)\b",
    )
});

static SURPRISE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\bsorprendeme\b|\brecomiend|\brecomend|\blo que tu sugieras\b|\bsugiere|\bsurprise me\b|\brecommend|\bsuggest",
    )
});

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?:hola|que onda|buenas|buenos dias|buenas tardes|buenas noches|hello|hi|hey|good (?:morning|afternoon|evening))\b",
    )
});

/// Inputs shared by every rule
pub struct Signals<'a> {
    pub folded: &'a str,
    pub extracted: &'a Slots,
}

pub fn is_reset(s: &Signals<'_>) -> bool {
    RESET.is_match(s.folded)
}

pub fn is_new_locality(s: &Signals<'_>) -> bool {
    !s.extracted.locality.is_empty()
}

pub fn is_photo_request(s: &Signals<'_>) -> bool {
    PHOTO.is_match(s.folded)
}

pub fn is_dish_inquiry(s: &Signals<'_>) -> bool {
    DISH.is_match(s.folded)
}

pub fn is_recommend(s: &Signals<'_>) -> bool {
    SURPRISE.is_match(s.folded) || !s.extracted.cuisine.is_empty()
}

pub fn is_update_slot(s: &Signals<'_>) -> bool {
    !s.extracted.sub_area.is_empty() || !s.extracted.budget.is_empty()
}

pub fn is_chitchat(s: &Signals<'_>) -> bool {
    GREETING.is_match(s.folded)
}

type Rule = (Intent, fn(&Signals<'_>) -> bool);

/// Evaluation order
pub const RULES: &[Rule] = &[
    (Intent::Reset, is_reset),
    (Intent::NewLocality, is_new_locality),
    (Intent::PhotoRequest, is_photo_request),
    (Intent::DishInquiry, is_dish_inquiry),
    (Intent::Recommend, is_recommend),
    (Intent::UpdateSlot, is_update_slot),
    (Intent::Chitchat, is_chitchat),
];

/// Classify a message given the slot values extracted from it
pub fn classify(message: &str, extracted: &Slots) -> Intent {
    let folded = fold(message);
    let signals = Signals {
        folded: &folded,
        extracted,
    };
    RULES
        .iter()
        .find(|(_, rule)| rule(&signals))
        .map_or(Intent::Unknown, |(intent, _)| *intent)
}

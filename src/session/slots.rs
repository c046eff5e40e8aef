//! Search slots and the merge rule that fills them
//!
//! Slot values are always definite strings. An empty string means "unknown";
//! there is no separate "absent" state, so merges never need null checks.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;

static BUDGET_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,6}").expect("budget pattern is valid"));

/// One of the four search parameters tracked per conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Locality,
    SubArea,
    Cuisine,
    Budget,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Locality, Slot::SubArea, Slot::Cuisine, Slot::Budget];

    /// Name used on the wire (`next_slot`)
    pub fn wire_name(self) -> &'static str {
        match self {
            Slot::Locality => "locality",
            Slot::SubArea => "sub_area",
            Slot::Cuisine => "cuisine",
            Slot::Budget => "budget",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Slot values. Also used as the partial update record produced by extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    #[serde(default, alias = "city", deserialize_with = "lenient_text")]
    pub locality: String,
    #[serde(default, alias = "zone", alias = "subArea", deserialize_with = "lenient_text")]
    pub sub_area: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cuisine: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub budget: String,
}

/// Accept a slot value sent as a string, a number or null
pub fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

impl Slots {
    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Locality => &self.locality,
            Slot::SubArea => &self.sub_area,
            Slot::Cuisine => &self.cuisine,
            Slot::Budget => &self.budget,
        }
    }

    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        let value = value.into();
        match slot {
            Slot::Locality => self.locality = value,
            Slot::SubArea => self.sub_area = value,
            Slot::Cuisine => self.cuisine = value,
            Slot::Budget => self.budget = value,
        }
    }

    pub fn is_filled(&self, slot: Slot) -> bool {
        !self.get(slot).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|slot| self.get(*slot).trim().is_empty())
    }

    /// Apply every non-empty (after normalization) field of `updates` over `self`.
    pub fn merged(&self, updates: &Slots) -> Slots {
        let mut out = self.clone();
        for slot in Slot::ALL {
            let value = normalize(slot, updates.get(slot));
            if !value.is_empty() {
                out.set(slot, value);
            }
        }
        out
    }
}

/// Normalize one incoming slot value: trim, and reduce budgets to their
/// first 2-6 digit run (empty when there is none).
pub fn normalize(slot: Slot, raw: &str) -> String {
    let trimmed = raw.trim();
    match slot {
        Slot::Budget => BUDGET_RUN
            .find(trimmed)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        _ => trimmed.to_string(),
    }
}

/// `merge(current, updates) -> slots'`
pub fn merge(current: &Slots, updates: &Slots) -> Slots {
    current.merged(updates)
}

//! Cuisine synonym tables
//!
//! Two views of the same vocabulary: `canonicalize` maps a folded message to
//! one canonical cuisine key (used by extraction), and `expand` turns a
//! canonical key into the broader name/tag patterns used to query and score
//! live venues.

use crate::nlu::fold::fold;
use regex::Regex;
use std::sync::LazyLock;

/// Synonym groups, most specific first. Matched against folded text.
const GROUPS: &[(&str, &str)] = &[
    ("ramen", r"\bramen\b|\bnoodles?\b"),
    ("sushi", r"\bsushi\b|\bomakase\b|\bizakaya\b"),
    ("italian", r"\bpizzas?\b|\btrattoria\b|\bpasta\b|\bitalian[oa]?\b|\bosteria\b"),
    ("tacos", r"\btacos?\b|\bpastor\b|\bbirria\b|\bbarbacoa\b|\btaquer"),
    ("vegetarian", r"\bveg(?:etarian|an)"),
    ("seafood", r"\bmariscos?\b|\bsea ?food\b"),
    ("burger", r"\bburg(?:er|uesa)s?\b|\bhamburg"),
    ("japanese", r"\bjapones[a]?\b|\bjapanese\b"),
    ("chinese", r"\bchin[ao]\b|\bchinese\b"),
    ("mexican", r"\bmexican[oa]?\b"),
    ("street food", r"\bcomida callejera\b|\bstreet ?food\b|\bantojitos?\b"),
];

static COMPILED_GROUPS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    GROUPS
        .iter()
        .map(|(canonical, pattern)| {
            (
                *canonical,
                Regex::new(pattern).expect("cuisine group pattern is valid"),
            )
        })
        .collect()
});

static STREET_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"tacos?|taquer|birria|pastor|barbacoa|antojitos?|garnachas?|mariscos?|sea ?food|pozole|tlayuda|arepa|empanada|street ?food|callejera",
    )
    .expect("street hint pattern is valid")
});

/// Canonical cuisine key for the first synonym group found in `folded`
pub fn canonicalize(folded: &str) -> Option<&'static str> {
    COMPILED_GROUPS
        .iter()
        .find(|(_, re)| re.is_match(folded))
        .map(|(canonical, _)| *canonical)
}

/// True when a requested cuisine implies street food (enables fast-food venues)
pub fn wants_street_food(cuisine: &str) -> bool {
    STREET_HINT.is_match(&fold(cuisine))
}

/// Name and tag alternatives for one requested cuisine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CuisineExpansion {
    /// Alternation matched against venue names
    pub name_pattern: String,
    /// Alternation matched against `cuisine=*` tags; empty when unknown
    pub cuisine_pattern: String,
    /// Also match venues flagged vegetarian/vegan by diet tags
    pub diet: bool,
}

impl CuisineExpansion {
    fn new(name_pattern: &str, cuisine_pattern: &str) -> Self {
        Self {
            name_pattern: name_pattern.to_string(),
            cuisine_pattern: cuisine_pattern.to_string(),
            diet: false,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.name_pattern.is_empty() && self.cuisine_pattern.is_empty()
    }

    /// Case-insensitive matcher used for scoring: the tag pattern when known,
    /// the name pattern otherwise.
    pub fn matcher(&self) -> Option<Regex> {
        let pattern = if self.cuisine_pattern.is_empty() {
            &self.name_pattern
        } else {
            &self.cuisine_pattern
        };
        if pattern.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){pattern}")).ok()
    }
}

/// Broaden a requested cuisine into query patterns
pub fn expand(cuisine: &str) -> CuisineExpansion {
    let term = fold(cuisine.trim());
    let has = |needle: &str| term.contains(needle);

    if has("vegetari") || has("vegan") {
        return CuisineExpansion {
            diet: true,
            ..CuisineExpansion::new("(veg|vegetari|vegan)", "(vegetarian|vegan)")
        };
    }
    if has("ramen") || has("noodle") {
        return CuisineExpansion::new("(ramen|noodle|izakaya|japanese)", "(ramen|noodle|japanese)");
    }
    if has("sushi") || has("omakase") {
        return CuisineExpansion::new("(sushi|izakaya|omakase)", "(sushi|japanese|omakase)");
    }
    if ["pizza", "italian", "trattoria", "pasta", "osteria"]
        .iter()
        .any(|w| has(w))
    {
        return CuisineExpansion::new(
            "(pizza|trattoria|italian|pasta|osteria)",
            "(pizza|italian|pasta|trattoria|osteria)",
        );
    }
    if ["taco", "pastor", "birria", "barbacoa", "taquer"]
        .iter()
        .any(|w| has(w))
    {
        return CuisineExpansion::new(
            "(taco|taquer|pastor|birria|barbacoa)",
            "(mexican|taco|pastor|birria|barbacoa)",
        );
    }
    if has("burger") || has("hamburg") {
        return CuisineExpansion::new("(burger|hamburg)", "(burger|hamburg|american)");
    }
    if has("seafood") || has("marisc") {
        return CuisineExpansion::new(
            "(marisc|seafood|ostion|ceviche|pescado|fish)",
            "(seafood|fish|mariscos)",
        );
    }
    if has("japan") || has("japon") {
        return CuisineExpansion::new(
            "(japon|japanese|sushi|ramen|izakaya)",
            "(japanese|sushi|ramen)",
        );
    }
    if has("chin") {
        return CuisineExpansion::new(
            "(chin|dim sum|dumpling|wok)",
            "(chinese|dim_sum|cantonese|sichuan)",
        );
    }
    if has("street food") || has("callejera") || has("antojito") {
        return CuisineExpansion::new(
            "(taco|taquer|antojito|garnacha|tlayuda|quesadilla|torta)",
            "(mexican|taco|street_food|regional)",
        );
    }
    if has("mexican") {
        return CuisineExpansion::new("(mexican|cocina|fonda|antojito)", "(mexican|regional)");
    }

    CuisineExpansion {
        name_pattern: if term.is_empty() {
            String::new()
        } else {
            regex::escape(&term)
        },
        cuisine_pattern: String::new(),
        diet: false,
    }
}

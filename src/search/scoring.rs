//! Quality scoring for live venues
//!
//! | signal                                        | points |
//! |-----------------------------------------------|--------|
//! | amenity is `restaurant`                       | +3     |
//! | any cuisine tag                               | +2     |
//! | website or phone                              | +2     |
//! | wine-bar marker in name                       | +1     |
//! | requested cuisine in name / in cuisine tags   | +3 / +2|
//! | fine-dining marker in name                    | +3     |
//! | fast food, street food wanted, taco marker    | +2     |
//! | fast food, street food wanted, no marker      | -2     |
//! | fast food, street food not wanted             | -5     |
//!
//! Unnamed and chain venues are excluded outright. Survivors must score
//! above [`QUALITY_FLOOR`].

use super::{Amenity, MapPlace, QualitySignal, Venue, MAX_RESULTS};
use crate::nlu::fold::fold;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub const QUALITY_FLOOR: i32 = 2;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("scoring pattern is valid")
}

static CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"vips|sanborns|toks\b|starbucks|domino|little\s*caesars|papa\s*john|pizza\s*hut|kfc|burger\s*king|\bbk\b|subway|ihop|chili'?s|applebee'?s|olive\s*garden|denny'?s|sushi\s*roll|wingstop|potzolcalli|farolito",
    )
});

static FINE_DINING: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"trattoria|osteria|bistro|brasserie|steakhouse|asador|omakase|kaiseki|chef|tasting|degustacion|alta\s*cocina|\bfine\b|gastronom|izakaya",
    )
});

static WINE: LazyLock<Regex> = LazyLock::new(|| compile(r"wine|bar\s*a\s*vins|enoteca|vinoteca"));

static STREET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"taco|taquer|birria|pastor|barbacoa"));

/// Per-search scoring inputs
pub struct ScoringContext {
    pub street_food: bool,
    /// Case-insensitive matcher for the requested cuisine
    pub matcher: Option<Regex>,
}

impl ScoringContext {
    pub fn new(street_food: bool, matcher: Option<Regex>) -> Self {
        Self {
            street_food,
            matcher,
        }
    }
}

pub fn is_chain(folded_name: &str, branded: bool) -> bool {
    branded || CHAIN.is_match(folded_name)
}

/// Score one place; `None` when it must never be shown.
pub fn score(place: &MapPlace, context: &ScoringContext) -> Option<i32> {
    if place.name.trim().is_empty() {
        return None;
    }
    let name = fold(&place.name);
    if is_chain(&name, place.branded) {
        return None;
    }

    let mut points = 0;
    if place.amenity == Amenity::Restaurant {
        points += 3;
    }
    if !place.cuisines.is_empty() {
        points += 2;
    }
    if place.has_contact {
        points += 2;
    }
    if WINE.is_match(&name) {
        points += 1;
    }
    if let Some(matcher) = &context.matcher {
        if matcher.is_match(&name) {
            points += 3;
        }
        if place.cuisines.iter().any(|c| matcher.is_match(c)) {
            points += 2;
        }
    }
    if FINE_DINING.is_match(&name) {
        points += 3;
    }
    if place.amenity == Amenity::FastFood {
        points += match (context.street_food, STREET_MARKER.is_match(&name)) {
            (true, true) => 2,
            (true, false) => -2,
            (false, _) => -5,
        };
    }
    Some(points)
}

/// Deduplicate, score, filter and order live places.
///
/// Ties are broken by name then id so the output is a pure function of the
/// input set.
pub fn rank(places: Vec<MapPlace>, context: &ScoringContext) -> Vec<Venue> {
    let mut seen = HashSet::new();
    let mut scored: Vec<(i32, MapPlace)> = places
        .into_iter()
        .filter(|p| seen.insert(format!("{}|{}", fold(&p.name), fold(&p.address))))
        .filter_map(|p| score(&p, context).map(|s| (s, p)))
        .filter(|(s, _)| *s > QUALITY_FLOOR)
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| {
        sb.cmp(sa)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(score, place)| Venue {
            id: place.id,
            name: place.name,
            cuisines: place.cuisines,
            address: place.address,
            location: place.location,
            amenity: place.amenity,
            has_contact: place.has_contact,
            website: place.website,
            signal: QualitySignal::Quality { score },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuisine::expand;
    use crate::testing::map_place;
    use proptest::prelude::*;

    fn context(cuisine: &str, street_food: bool) -> ScoringContext {
        ScoringContext::new(street_food, expand(cuisine).matcher())
    }

    #[test]
    fn test_score_table() {
        let ctx = context("ramen", false);
        let mut place = map_place("node/1", "Ramen Ichi", "restaurant", &["ramen"]);
        place.has_contact = true;
        // restaurant 3 + tag 2 + contact 2 + name match 3 + tag match 2
        assert_eq!(score(&place, &ctx), Some(12));

        let fine = map_place("node/2", "Trattoria Lucca", "restaurant", &[]);
        assert_eq!(score(&fine, &context("", false)), Some(6));

        let wine = map_place("node/3", "Enoteca Roma", "cafe", &[]);
        assert_eq!(score(&wine, &context("", false)), Some(1));
    }

    #[test]
    fn test_fast_food_rules() {
        let taco = map_place("node/1", "Tacos El Paisa", "fast_food", &[]);
        let hot_dog = map_place("node/2", "Dogos Pepe", "fast_food", &[]);
        let street = context("tacos", true);
        let plain = context("", false);

        // street: name match 3 + marker 2
        assert_eq!(score(&taco, &street), Some(5));
        assert_eq!(score(&hot_dog, &street), Some(-2));
        assert_eq!(score(&hot_dog, &plain), Some(-5));
    }

    #[test]
    fn test_chains_and_unnamed_are_excluded() {
        let ctx = context("", false);
        assert_eq!(score(&map_place("node/1", "VIPS Reforma", "restaurant", &["mexican"]), &ctx), None);
        assert_eq!(score(&map_place("node/2", "Burger King", "fast_food", &[]), &ctx), None);
        assert_eq!(score(&map_place("node/3", "", "restaurant", &["mexican"]), &ctx), None);

        let mut branded = map_place("node/4", "Café Local", "cafe", &["coffee"]);
        branded.branded = true;
        assert_eq!(score(&branded, &ctx), None);
    }

    #[test]
    fn test_rank_dedupes_filters_and_orders() {
        let ctx = context("", false);
        let places = vec![
            map_place("node/1", "Contramar", "restaurant", &["seafood"]),
            map_place("node/2", "contramar", "restaurant", &["seafood"]),
            map_place("node/3", "Café Sin Nada", "cafe", &[]),
            map_place("node/4", "Bistro Alfonso", "restaurant", &[]),
        ];
        let names: Vec<String> = rank(places, &ctx).into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Bistro Alfonso", "Contramar"]);
    }

    #[test]
    fn test_rank_caps_results() {
        let ctx = context("", false);
        let places = (0..20)
            .map(|i| map_place(&format!("node/{i}"), &format!("Fonda {i}"), "restaurant", &["mexican"]))
            .collect();
        assert_eq!(rank(places, &ctx).len(), MAX_RESULTS);
    }

    fn arb_place() -> impl Strategy<Value = MapPlace> {
        (
            "[A-Za-z ]{0,12}",
            prop::sample::select(vec!["restaurant", "cafe", "fast_food", "bar"]),
            prop::collection::vec(prop::sample::select(vec!["ramen", "mexican", "pizza", "coffee"]), 0..3),
            any::<bool>(),
            prop::sample::select(vec!["", "Vips", "Tacos", "Trattoria", "Starbucks", "Enoteca"]),
        )
            .prop_map(|(base, amenity, cuisines, contact, marker)| {
                let cuisines: Vec<&str> = cuisines;
                let mut place = map_place("", &format!("{marker} {base}"), amenity, &cuisines);
                place.has_contact = contact;
                place
            })
    }

    fn with_unique_ids(places: Vec<MapPlace>) -> Vec<MapPlace> {
        places
            .into_iter()
            .enumerate()
            .map(|(i, mut p)| {
                p.id = format!("node/{i}");
                p.name = format!("{} {i}", p.name);
                p
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_rank_is_order_independent(
            places in prop::collection::vec(arb_place(), 0..30),
            seed in any::<u64>(),
            street in any::<bool>(),
        ) {
            let places = with_unique_ids(places);
            let mut shuffled = places.clone();
            // deterministic permutation from the seed
            shuffled.sort_by_key(|p| {
                let mut h = seed;
                for b in p.id.bytes() {
                    h = h.wrapping_mul(31).wrapping_add(u64::from(b));
                }
                h
            });

            let ctx = context("ramen", street);
            prop_assert_eq!(rank(places.clone(), &ctx), rank(shuffled, &ctx));
            prop_assert_eq!(rank(places.clone(), &ctx), rank(places, &ctx));
        }

        #[test]
        fn prop_chains_never_ranked(places in prop::collection::vec(arb_place(), 0..30)) {
            let places = with_unique_ids(places);
            let ranked = rank(places, &context("", false));
            prop_assert!(ranked.len() <= MAX_RESULTS);
            for venue in ranked {
                prop_assert!(!is_chain(&fold(&venue.name), false), "chain ranked: {}", venue.name);
                let QualitySignal::Quality { score: points } = venue.signal else {
                    panic!("live venues carry a quality score");
                };
                prop_assert!(points > QUALITY_FLOOR);
            }
        }
    }
}

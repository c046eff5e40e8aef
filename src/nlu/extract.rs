//! Pattern extraction of slot values from a raw message
//!
//! Each field is extracted independently, so one message can yield both a
//! locality and a cuisine. Every field is always present in the result; an
//! unmatched field is the empty string.

use super::fold::Folded;
use crate::cuisine;
use crate::session::Slots;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Words that end a captured free-text value
const STOP: &str = r"(?:$|[,.;:!?]|\s(?:y|and|con|with|pero|but|quiero|busco|i want|looking|por|for|para|cerca|near)\b)";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extraction pattern is valid")
}

static LOCALITY_RULES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // "estoy en X", "ahora en X", "I'm in X", "now in X"
        compile(&format!(
            r"\b(?:estoy|ando|ahora|i(?:'|’)?m|i am|now|we(?:'|’)?re|we are)\s+(?:en|in|at)\s+(?P<v>\p{{L}}[\p{{L}} .'-]*?)\s*{STOP}"
        )),
        // bare "en X" / "in X"
        compile(r"^\s*(?:en|in)\s+(?P<v>\p{L}[\p{L} .'-]*?)\s*[.!]?\s*$"),
        // well-known city names and abbreviations
        compile(r"\b(?P<v>ciudad de mexico|mexico city|cdmx|mexico|guadalajara|monterrey|gdl|mty)\b"),
    ]
});

static SUB_AREA_RULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b(?:zona|colonia|col\.|barrio|rumbo|area|neighbou?rhood|district)\s+(?:(?:de|del|la|el|of)\s+)*(?P<v>[\p{{L}}\d][\p{{L}}\d .'-]*?)\s*{STOP}"
    ))
});

static CRAVING_RULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b(?:tengo antojo de|se me antojan?|antojo de|quiero|i want|i(?:'|’)?m craving|craving|i feel like)\s+(?:(?:comer|algo de|un|una|unos|unas|some|to eat|eat)\s+)*(?P<v>\p{{L}}[\p{{L}} .'-]*?)\s*(?:{STOP}|\s(?:en|in|at)\b)"
    ))
});

/// Generic captures that name something other than a cuisine
static NOT_A_CUISINE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^(?:algo|comer|something|food|comida)$|^(?:ver|see|saber|know|ir|go|empezar|start|reiniciar|restart)\b|\b(?:fotos?|photos?|pic|pictures?|menu|carta)\b",
    )
});

static BUDGET_RULE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:\$|mxn|usd)?\s?(?P<v>\d{2,6})"));

static PLACE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:en|at|de|del|of|from|para)\s+(?P<v>\p{L}[\p{L}\d .'&-]*?)\s*[?!.]*\s*$")
});

static DEICTIC: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?:ahi|alli|alla|ese lugar|ese restaurante|ese sitio|ese|esa|that place|that one|that restaurant|there|the first|el primero)\b",
    )
});

fn captured<'a>(folded: &Folded<'a>, caps: &Captures<'_>) -> String {
    caps.name("v")
        .map(|m| {
            folded
                .original_span(m.range())
                .trim()
                .trim_end_matches(['.', ',', '!', '?', '\''])
                .to_string()
        })
        .unwrap_or_default()
}

fn first_capture(folded: &Folded<'_>, rules: &[Regex]) -> String {
    rules
        .iter()
        .find_map(|re| re.captures(folded.as_str()))
        .map(|caps| captured(folded, &caps))
        .unwrap_or_default()
}

pub fn extract_locality(folded: &Folded<'_>) -> String {
    first_capture(folded, LOCALITY_RULES.as_slice())
}

pub fn extract_sub_area(folded: &Folded<'_>) -> String {
    first_capture(folded, std::slice::from_ref(&*SUB_AREA_RULE))
}

/// Synonym table first; the generic "I want / craving X" phrasing only when
/// no table entry matches.
pub fn extract_cuisine(folded: &Folded<'_>) -> String {
    if let Some(canonical) = cuisine::canonicalize(folded.as_str()) {
        return canonical.to_string();
    }
    let generic = first_capture(folded, std::slice::from_ref(&*CRAVING_RULE));
    if NOT_A_CUISINE.is_match(&super::fold::fold(&generic)) {
        return String::new();
    }
    generic
}

pub fn extract_budget(folded: &Folded<'_>) -> String {
    BUDGET_RULE
        .captures(folded.as_str())
        .and_then(|caps| caps.name("v"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Partial slot update for one message
pub fn extract(message: &str) -> Slots {
    let folded = Folded::new(message);
    Slots {
        locality: extract_locality(&folded),
        sub_area: extract_sub_area(&folded),
        cuisine: extract_cuisine(&folded),
        budget: extract_budget(&folded),
    }
}

/// Trailing "at X" / "de X" reference to a venue, used by follow-up questions
pub fn extract_place_reference(message: &str) -> String {
    let folded = Folded::new(message);
    first_capture(&folded, std::slice::from_ref(&*PLACE_REFERENCE))
}

/// True when the message points at a previously shown venue without naming it
pub fn is_deictic(folded: &str) -> bool {
    DEICTIC.is_match(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locality_i_am_in() {
        assert_eq!(extract("Estoy en Guadalajara").locality, "Guadalajara");
        assert_eq!(extract("ahora en Puebla!").locality, "Puebla");
        assert_eq!(extract("I'm in Mexico City").locality, "Mexico City");
        assert_eq!(extract("now in Oaxaca, any tips?").locality, "Oaxaca");
    }

    #[test]
    fn test_locality_stops_at_connector() {
        let slots = extract("estoy en Ciudad de México y quiero ramen");
        assert_eq!(slots.locality, "Ciudad de México");
        assert_eq!(slots.cuisine, "ramen");
    }

    #[test]
    fn test_locality_bare_in() {
        assert_eq!(extract("en Mérida").locality, "Mérida");
        assert_eq!(extract("in Tulum.").locality, "Tulum");
        // "en" in the middle of a sentence is not a bare locality
        assert_eq!(extract("qué pido en Pujol").locality, "");
    }

    #[test]
    fn test_locality_known_alias() {
        assert_eq!(extract("sushi en CDMX").locality, "CDMX");
        assert_eq!(extract("ramen por GDL").locality, "GDL");
    }

    #[test]
    fn test_accent_insensitive() {
        assert_eq!(extract("ESTÓY EN León").locality, "León");
    }

    #[test]
    fn test_sub_area() {
        assert_eq!(extract("zona Roma Norte").sub_area, "Roma Norte");
        assert_eq!(extract("por la colonia del Valle, porfa").sub_area, "Valle");
        assert_eq!(extract("neighborhood of Polanco").sub_area, "Polanco");
        assert_eq!(extract("quiero tacos").sub_area, "");
    }

    #[test]
    fn test_cuisine_table_beats_generic() {
        assert_eq!(extract("tengo antojo de un omakase").cuisine, "sushi");
        assert_eq!(extract("quiero pizza").cuisine, "italian");
    }

    #[test]
    fn test_cuisine_generic_fallback() {
        assert_eq!(extract("tengo antojo de comida coreana").cuisine, "comida coreana");
        assert_eq!(extract("I'm craving Thai").cuisine, "Thai");
        assert_eq!(extract("quiero comer pozole en Puebla").cuisine, "pozole");
    }

    #[test]
    fn test_generic_capture_rejects_non_cuisines() {
        assert_eq!(extract("quiero ver fotos").cuisine, "");
        assert_eq!(extract("quiero algo").cuisine, "");
    }

    #[test]
    fn test_budget() {
        assert_eq!(extract("unos $300 por persona").budget, "300");
        assert_eq!(extract("hasta 450 pesos").budget, "450");
        assert_eq!(extract("5 personas").budget, "");
    }

    #[test]
    fn test_unmatched_fields_are_empty() {
        let slots = extract("hola");
        assert!(slots.is_empty());
    }

    #[test]
    fn test_place_reference() {
        assert_eq!(extract_place_reference("¿qué pido en Contramar?"), "Contramar");
        assert_eq!(extract_place_reference("photos of Máximo Bistrot"), "Máximo Bistrot");
        assert_eq!(extract_place_reference("hola"), "");
    }

    #[test]
    fn test_deictic() {
        assert!(is_deictic("fotos de ese lugar"));
        assert!(is_deictic("what should i order there"));
        assert!(!is_deictic("fotos de contramar"));
    }
}

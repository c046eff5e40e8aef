//! Spanish and English reply text for turn decisions
//!
//! The body (`reply`) never asks anything; the one clarifying question a
//! decision may carry is rendered separately as `followup`.

use crate::cuisine;
use crate::nlu::fold::fold;
use crate::nlu::Language;
use crate::search::Venue;
use crate::session::{Slot, Slots};
use crate::turn::{Decision, FollowUpKind, Question};
use serde::Serialize;

/// Venues listed in the reply body
const LISTED: usize = 3;
/// Cuisine tags shown per listed venue
const TAGS_SHOWN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub reply: String,
    pub followup: String,
}

/// Signature dishes per canonical cuisine
const DISHES: &[(&str, &[&str])] = &[
    ("ramen", &["tonkotsu ramen", "shoyu ramen", "gyozas"]),
    ("sushi", &["nigiri del día", "omakase", "temaki de atún"]),
    ("italian", &["pasta fresca", "pizza napolitana", "tiramisú"]),
    ("tacos", &["tacos al pastor", "suadero", "campechano"]),
    ("vegetarian", &["bowl de temporada", "tacos de hongos", "curry de verduras"]),
    ("seafood", &["aguachile", "tostada de atún", "pescado a la talla"]),
    ("burger", &["hamburguesa de la casa", "papas trufadas", "malteada"]),
    ("japanese", &["katsu", "tempura", "donburi"]),
    ("chinese", &["dim sum", "pato laqueado", "dumplings"]),
    ("mexican", &["mole", "chiles en nogada", "enchiladas"]),
    ("street food", &["tlayudas", "quesadillas", "tacos de canasta"]),
];

pub fn ask(slot: Slot, language: Language) -> &'static str {
    match (slot, language) {
        (Slot::Locality, Language::Es) => "¿En qué ciudad estás?",
        (Slot::Locality, Language::En) => "Which city are you in?",
        (Slot::SubArea, Language::Es) => "¿Alguna zona o colonia preferida?",
        (Slot::SubArea, Language::En) => "Any preferred area or neighborhood?",
        (Slot::Cuisine, Language::Es) => "¿Qué se te antoja?",
        (Slot::Cuisine, Language::En) => "What are you craving?",
        (Slot::Budget, Language::Es) => "¿Presupuesto aproximado por persona?",
        (Slot::Budget, Language::En) => "Approximate budget per person?",
    }
}

fn which_place(language: Language) -> &'static str {
    match language {
        Language::Es => "¿De cuál lugar? Dime el nombre.",
        Language::En => "Which place? Tell me its name.",
    }
}

pub fn render(decision: &Decision, language: Language, slots: &Slots) -> Reply {
    let es = language == Language::Es;
    let reply = match decision {
        Decision::Greet { .. } => pick(
            es,
            "¡Hola! Soy Remy 👋 Chef de cabecera y cazador de buenos lugares.",
            "Hey! I'm Remy 👋 a chef-y guide to great spots.",
        ),
        Decision::ResetDone => pick(es, "Listo, reinicié la conversación.", "Done, I reset our chat."),
        Decision::AskSlot { slot } => ask_lead(*slot, es, slots),
        Decision::CannotLocate { locality, sub_area } => {
            let place = join_place(locality, sub_area);
            if es {
                format!("No ubico bien {place}.")
            } else {
                format!("I couldn't place {place}.")
            }
        }
        Decision::Nudge {
            locality, cuisine, ..
        } => nudge(es, locality, cuisine),
        Decision::Results { venues, .. } => {
            list_message(venues, es, &join_place(&slots.locality, &slots.sub_area))
        }
        Decision::VenueFollowUp {
            kind: FollowUpKind::Photos,
            venue,
        } => photos(venue, es),
        Decision::VenueFollowUp {
            kind: FollowUpKind::Dishes,
            venue,
        } => dishes(venue, es),
        Decision::AskWhichPlace {
            kind: FollowUpKind::Photos,
        } => pick(es, "Con gusto te paso fotos.", "Happy to share photos."),
        Decision::AskWhichPlace {
            kind: FollowUpKind::Dishes,
        } => pick(es, "Con gusto te digo qué pedir.", "Happy to tell you what to order."),
        Decision::TechnicalHiccup => pick(
            es,
            "Tuve un problema técnico. Probemos de nuevo.",
            "Technical hiccup. Let's try again.",
        ),
    };

    let followup = match decision.question() {
        Some(Question::Slot(slot)) => ask(slot, language).to_string(),
        Some(Question::WhichPlace) => which_place(language).to_string(),
        None => String::new(),
    };

    Reply { reply, followup }
}

fn pick(es: bool, spanish: &str, english: &str) -> String {
    let text = if es { spanish } else { english };
    text.to_string()
}

fn join_place(locality: &str, sub_area: &str) -> String {
    [sub_area.trim(), locality.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn ask_lead(slot: Slot, es: bool, slots: &Slots) -> String {
    let locality = slots.locality.trim();
    match slot {
        Slot::Locality if es => "Para ayudarte bien, necesito tu ciudad.".to_string(),
        Slot::Locality => "To help properly, I need your city.".to_string(),
        Slot::Cuisine if es => format!("Perfecto, {locality}."),
        Slot::Cuisine => format!("Great, {locality}."),
        Slot::SubArea if es => format!("Va, {locality}. Afinemos un poco."),
        Slot::SubArea => format!("Got it, {locality}. Let's narrow it down."),
        Slot::Budget if es => "Casi listo.".to_string(),
        Slot::Budget => "Almost there.".to_string(),
    }
}

fn nudge(es: bool, locality: &str, cuisine: &str) -> String {
    match (es, cuisine.trim()) {
        (true, "") => format!(
            "Para darte algo top en {locality}, dime una zona (p. ej. Roma, Condesa, Polanco) o ajusta el antojo."
        ),
        (true, cuisine) => format!(
            "Para darte algo top en {locality} para {cuisine}, dime una zona (p. ej. Roma, Condesa, Polanco) o ajusta el antojo."
        ),
        (false, "") => format!(
            "To land something great in {locality}, tell me a neighborhood or tweak the craving."
        ),
        (false, cuisine) => format!(
            "To land something great in {locality} for {cuisine}, tell me a neighborhood or tweak the craving."
        ),
    }
}

fn list_message(venues: &[Venue], es: bool, place: &str) -> String {
    let head = match (es, place.is_empty()) {
        (true, true) => "Te dejo opciones:".to_string(),
        (true, false) => format!("Te dejo opciones en {place}:"),
        (false, true) => "Here are some options:".to_string(),
        (false, false) => format!("Here are some options in {place}:"),
    };
    let mut lines = vec![head];
    for venue in venues.iter().take(LISTED) {
        let mut line = format!("• {}", venue.name);
        if !venue.cuisines.is_empty() {
            let tags: Vec<&str> = venue
                .cuisines
                .iter()
                .take(TAGS_SHOWN)
                .map(String::as_str)
                .collect();
            line.push_str(&format!(" ({})", tags.join(", ")));
        }
        if !venue.address.is_empty() {
            line.push_str(&format!(" · {}", venue.address));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Map link for a venue: the element page for live venues, a pin otherwise
pub fn map_link(venue: &Venue) -> Option<String> {
    let is_element = ["node/", "way/", "relation/"]
        .iter()
        .any(|prefix| venue.id.starts_with(prefix));
    if is_element {
        return Some(format!("https://www.openstreetmap.org/{}", venue.id));
    }
    venue.location.map(|c| {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}",
            lat = c.lat,
            lon = c.lon
        )
    })
}

fn photos(venue: &Venue, es: bool) -> String {
    let mut lines = vec![if es {
        format!("Fotos y ubicación de {}:", venue.name)
    } else {
        format!("Photos and location for {}:", venue.name)
    }];
    if let Some(link) = map_link(venue) {
        lines.push(link);
    }
    if let Some(website) = &venue.website {
        lines.push(website.clone());
    }
    if lines.len() == 1 {
        lines.push(if es {
            "No tengo enlaces para este lugar, búscalo por nombre en tu app de mapas.".to_string()
        } else {
            "I have no links for this place; search its name in your maps app.".to_string()
        });
    }
    lines.join("\n")
}

/// Signature dishes for the venue's cuisine, matched on tags then name
pub fn signature_dishes(venue: &Venue) -> Option<&'static [&'static str]> {
    let text = fold(&format!("{} {}", venue.cuisines.join(" "), venue.name));
    let key = cuisine::canonicalize(&text)?;
    DISHES
        .iter()
        .find(|(cuisine, _)| *cuisine == key)
        .map(|(_, dishes)| *dishes)
}

fn dishes(venue: &Venue, es: bool) -> String {
    match (signature_dishes(venue), es) {
        (Some(dishes), true) => format!("En {} te recomiendo: {}.", venue.name, dishes.join(", ")),
        (Some(dishes), false) => format!("At {} I'd go for: {}.", venue.name, dishes.join(", ")),
        (None, true) => format!(
            "En {} pregunta por la especialidad de la casa; suele ser lo mejor.",
            venue.name
        ),
        (None, false) => format!(
            "At {} ask for the house specialty; it's usually the best bet.",
            venue.name
        ),
    }
}

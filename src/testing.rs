//! Mock implementations for testing
//!
//! These mocks stand in for the geocoder, the live map source and the NLU
//! model so turn handling can be exercised without network I/O.

use crate::geo::{Coordinate, GeoError, GeoHit, Geocoder, PlaceLevel};
use crate::llm::LlmError;
use crate::nlu::{NluHints, NluService};
use crate::search::{Amenity, MapPlace, MapQuery, MapSource, QualitySignal, SourceError, Venue};
use crate::session::Slots;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

const ZOCALO: Coordinate = Coordinate {
    lat: 19.4326,
    lon: -99.1332,
};

// ============================================================================
// Mock Geocoder
// ============================================================================

/// Geocoder answering from a fixed table. Unknown queries find nothing.
#[allow(dead_code)]
pub struct MockGeocoder {
    hits: HashMap<String, GeoHit>,
    failures: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockGeocoder {
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            failures: HashSet::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hit(mut self, query: &str, hit: GeoHit) -> Self {
        self.hits.insert(query.to_string(), hit);
        self
    }

    /// Make `query` fail as if the service were down
    pub fn with_failure(mut self, query: &str) -> Self {
        self.failures.insert(query.to_string());
        self
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<GeoHit>, GeoError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failures.contains(query) {
            return Err(GeoError::Status(503));
        }
        Ok(self.hits.get(query).cloned())
    }
}

pub fn local_hit(lat: f64, lon: f64) -> GeoHit {
    GeoHit {
        coordinate: Some(Coordinate::new(lat, lon)),
        level: PlaceLevel::Local,
        display_name: format!("{lat}, {lon}"),
    }
}

/// Country-level match, too coarse to search around
pub fn country_hit() -> GeoHit {
    GeoHit {
        coordinate: Some(Coordinate::new(23.6585, -102.0077)),
        level: PlaceLevel::Country,
        display_name: "México".to_string(),
    }
}

// ============================================================================
// Mock Map Source
// ============================================================================

/// Live map source returning queued answers. An empty queue finds nothing.
#[allow(dead_code)]
pub struct MockMapSource {
    answers: Mutex<VecDeque<Result<Vec<MapPlace>, SourceError>>>,
    queries: Mutex<Vec<MapQuery>>,
}

#[allow(dead_code)]
impl MockMapSource {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_places(&self, places: Vec<MapPlace>) {
        self.answers.lock().unwrap().push_back(Ok(places));
    }

    pub fn queue_error(&self, error: SourceError) {
        self.answers.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn recorded_queries(&self) -> Vec<MapQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MapSource for MockMapSource {
    async fn query(&self, query: &MapQuery) -> Result<Vec<MapPlace>, SourceError> {
        self.queries.lock().unwrap().push(query.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Named, unbranded place next to the Zócalo with no contact details
pub fn map_place(id: &str, name: &str, amenity: &str, cuisines: &[&str]) -> MapPlace {
    MapPlace {
        id: id.to_string(),
        name: name.to_string(),
        amenity: Amenity::from_tag(amenity),
        cuisines: cuisines.iter().map(|c| (*c).to_string()).collect(),
        address: String::new(),
        location: Some(ZOCALO),
        website: None,
        has_contact: false,
        branded: false,
    }
}

/// Minimal curated venue; tests fill in whatever fields they care about
pub fn venue(name: &str) -> Venue {
    Venue {
        id: format!("canonical/{}", name.to_lowercase()),
        name: name.to_string(),
        cuisines: Vec::new(),
        address: String::new(),
        location: Some(ZOCALO),
        amenity: Amenity::Restaurant,
        has_contact: false,
        website: None,
        signal: QualitySignal::Prestige {
            score: 0.0,
            michelin: None,
            best_of_rank: None,
            green_star: false,
        },
    }
}

// ============================================================================
// Mock NLU
// ============================================================================

/// NLU returning queued hints. An empty queue behaves like an outage.
#[allow(dead_code)]
pub struct MockNlu {
    hints: Mutex<VecDeque<NluHints>>,
    messages: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockNlu {
    pub fn new() -> Self {
        Self {
            hints: Mutex::new(VecDeque::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_hints(&self, hints: NluHints) {
        self.hints.lock().unwrap().push_back(hints);
    }

    pub fn recorded_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NluService for MockNlu {
    async fn interpret(&self, message: &str, _slots: &Slots) -> Result<NluHints, LlmError> {
        self.messages.lock().unwrap().push(message.to_string());
        self.hints
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::network("No mock hints queued"))
    }
}

//! Two-tier venue search
//!
//! The curated dataset answers first. When it has fewer than three venues
//! near the point the live map source is queried, scored and used to top up
//! the list. A failing live source never fails the search.

pub mod canonical;
mod overpass;
pub mod scoring;

pub use canonical::{CanonicalDataset, CanonicalRecord, DatasetError};
pub use overpass::{MapQuery, OverpassClient, MAX_RADIUS_M, MIN_RADIUS_M};

use crate::cuisine;
use crate::geo::Coordinate;
use crate::nlu::fold::fold;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on venues returned by one search
pub const MAX_RESULTS: usize = 9;
/// Canonical results at or above this count skip the live tier
pub const CANONICAL_SUFFICIENT: usize = 3;

const CANONICAL_RADIUS_WITH_SUB_AREA_KM: f64 = 3.0;
const CANONICAL_RADIUS_KM: f64 = 7.0;
const LIVE_RADIUS_WITH_SUB_AREA_M: u32 = 1500;
const LIVE_RADIUS_STREET_FOOD_M: u32 = 2500;
const LIVE_RADIUS_M: u32 = 3500;
const LIVE_WIDEN_STEP_M: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Restaurant,
    Cafe,
    FastFood,
    Other,
}

impl Amenity {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "restaurant" => Amenity::Restaurant,
            "cafe" => Amenity::Cafe,
            "fast_food" => Amenity::FastFood,
            _ => Amenity::Other,
        }
    }
}

/// Source-specific ranking signal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum QualitySignal {
    /// Curated record
    Prestige {
        score: f64,
        michelin: Option<String>,
        best_of_rank: Option<u32>,
        green_star: bool,
    },
    /// Live venue, scored by [`scoring::score`]
    Quality { score: i32 },
}

/// A venue shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    /// Source-qualified id (`canonical/...`, `node/...`, `way/...`)
    pub id: String,
    pub name: String,
    pub cuisines: Vec<String>,
    pub address: String,
    pub location: Option<Coordinate>,
    pub amenity: Amenity,
    pub has_contact: bool,
    pub website: Option<String>,
    pub signal: QualitySignal,
}

/// Raw element from the live map source
#[derive(Debug, Clone, PartialEq)]
pub struct MapPlace {
    pub id: String,
    pub name: String,
    pub amenity: Amenity,
    pub cuisines: Vec<String>,
    pub address: String,
    pub location: Option<Coordinate>,
    pub website: Option<String>,
    pub has_contact: bool,
    /// Carries a brand identifier tag
    pub branded: bool,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("map source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("map source returned HTTP {0}")]
    Status(u16),
    #[error("map source payload malformed: {0}")]
    Malformed(String),
}

/// Live venue lookup
#[async_trait]
pub trait MapSource: Send + Sync {
    async fn query(&self, query: &MapQuery) -> Result<Vec<MapPlace>, SourceError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub center: Coordinate,
    /// Requested cuisine; empty for any
    pub cuisine: String,
    pub sub_area_given: bool,
}

pub struct SearchEngine {
    dataset: Arc<CanonicalDataset>,
    source: Arc<dyn MapSource>,
}

impl SearchEngine {
    pub fn new(dataset: Arc<CanonicalDataset>, source: Arc<dyn MapSource>) -> Self {
        Self { dataset, source }
    }

    pub fn dataset(&self) -> &CanonicalDataset {
        &self.dataset
    }

    /// Ranked venues near `request.center`, at most [`MAX_RESULTS`].
    pub async fn search(&self, request: &SearchRequest) -> Vec<Venue> {
        let radius_km = if request.sub_area_given {
            CANONICAL_RADIUS_WITH_SUB_AREA_KM
        } else {
            CANONICAL_RADIUS_KM
        };
        let mut venues =
            self.dataset
                .find_top(request.center, radius_km, &request.cuisine, MAX_RESULTS);

        if venues.len() >= CANONICAL_SUFFICIENT {
            tracing::info!(results = venues.len(), "Canonical tier sufficient");
            return venues;
        }

        let live = match self.search_live(request).await {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(error = %e, canonical = venues.len(), "Live tier failed");
                return venues;
            }
        };

        let mut seen: HashSet<String> = venues.iter().map(|v| fold(&v.name)).collect();
        for venue in live {
            if venues.len() >= MAX_RESULTS {
                break;
            }
            if seen.insert(fold(&venue.name)) {
                venues.push(venue);
            }
        }
        tracing::info!(results = venues.len(), "Search completed");
        venues
    }

    async fn search_live(&self, request: &SearchRequest) -> Result<Vec<Venue>, SourceError> {
        let expansion = cuisine::expand(&request.cuisine);
        let street_food = cuisine::wants_street_food(&request.cuisine);

        let mut query = MapQuery {
            center: request.center,
            radius_m: initial_live_radius(request.sub_area_given, street_food),
            name_pattern: expansion.name_pattern.clone(),
            cuisine_pattern: expansion.cuisine_pattern.clone(),
            include_fast_food: street_food,
            diet: expansion.diet,
        };
        query.radius_m = query.clamped_radius();

        let mut places = self.source.query(&query).await?;
        if places.is_empty() {
            query.radius_m = widened_radius(query.radius_m);
            tracing::debug!(radius_m = query.radius_m, "Widening live search");
            places = self.source.query(&query).await?;
        }

        let context = scoring::ScoringContext::new(street_food, expansion.matcher());
        Ok(scoring::rank(places, &context))
    }
}

fn initial_live_radius(sub_area_given: bool, street_food: bool) -> u32 {
    if sub_area_given {
        LIVE_RADIUS_WITH_SUB_AREA_M
    } else if street_food {
        LIVE_RADIUS_STREET_FOOD_M
    } else {
        LIVE_RADIUS_M
    }
}

fn widened_radius(radius_m: u32) -> u32 {
    (radius_m + LIVE_WIDEN_STEP_M).clamp(MIN_RADIUS_M, MAX_RADIUS_M)
}

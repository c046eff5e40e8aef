//! Coordinates, distances and geocoding
//!
//! The resolver turns a free-text locality (plus optional sub-area) into a
//! coordinate through an external geocoder, retrying once with a canonical
//! spelling of the locality.

mod nominatim;
mod resolver;

pub use nominatim::NominatimClient;
pub use resolver::{canonical_locality, LocalityResolver, Resolution};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometers
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine great-circle distance in kilometers
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// How coarse a geocoder match is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceLevel {
    /// Whole country: too coarse to search around
    Country,
    /// State, region or province
    Region,
    /// City, town, suburb, neighbourhood, street or venue
    Local,
}

/// Best geocoder match for a query
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    /// `None` when the match came back without usable coordinates
    pub coordinate: Option<Coordinate>,
    pub level: PlaceLevel,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder returned HTTP {0}")]
    Status(u16),
    #[error("geocoder payload malformed: {0}")]
    Malformed(String),
}

/// Free-text query to best-match coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<GeoHit>, GeoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let zocalo = Coordinate::new(19.4326, -99.1332);
        assert!(haversine_km(&zocalo, &zocalo).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Zócalo to Angel de la Independencia, roughly 3.6 km
        let zocalo = Coordinate::new(19.4326, -99.1332);
        let angel = Coordinate::new(19.4270, -99.1677);
        let d = zocalo.distance_km(&angel);
        assert!((3.4..3.9).contains(&d), "got {d}");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let cdmx = Coordinate::new(19.4326, -99.1332);
        let gdl = Coordinate::new(20.6597, -103.3496);
        let there = haversine_km(&cdmx, &gdl);
        let back = haversine_km(&gdl, &cdmx);
        assert!((there - back).abs() < 1e-9);
        assert!((450.0..480.0).contains(&there), "got {there}");
    }
}

//! Locality resolution with a single canonical-spelling retry

use super::{Coordinate, GeoHit, Geocoder, PlaceLevel};
use crate::nlu::fold::fold;
use std::sync::Arc;

/// Aliases and abbreviations of major cities, keyed by folded spelling
const ALIASES: &[(&[&str], &str)] = &[
    (
        &[
            "mx",
            "mexico",
            "cdmx",
            "df",
            "d.f.",
            "mexico df",
            "ciudad de mexico",
            "mexico city",
        ],
        "Ciudad de México",
    ),
    (&["gdl", "guadalajara"], "Guadalajara"),
    (&["mty", "monterrey"], "Monterrey"),
    (&["qro", "queretaro"], "Querétaro"),
    (&["oax", "oaxaca"], "Oaxaca de Juárez"),
];

/// Canonical spelling for a known alias; other input is returned trimmed.
pub fn canonical_locality(locality: &str) -> String {
    let key = fold(locality.trim());
    ALIASES
        .iter()
        .find(|(aliases, _)| aliases.contains(&key.as_str()))
        .map_or_else(|| locality.trim().to_string(), |(_, canonical)| (*canonical).to_string())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(Coordinate),
    NotFound,
}

pub struct LocalityResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocalityResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve `locality` (optionally narrowed by `sub_area`) to a coordinate.
    ///
    /// Never fails: an unreachable geocoder, a match without coordinates or a
    /// country-level match all end in `NotFound` once the canonical retry is
    /// exhausted.
    pub async fn resolve(&self, locality: &str, sub_area: &str) -> Resolution {
        let locality = locality.trim();
        let sub_area = sub_area.trim();
        if locality.is_empty() {
            return Resolution::NotFound;
        }

        let query = if sub_area.is_empty() {
            locality.to_string()
        } else {
            format!("{sub_area}, {locality}")
        };
        if let Some(coordinate) = self.attempt(&query).await {
            return Resolution::Found(coordinate);
        }

        let canonical = canonical_locality(locality);
        if canonical != locality {
            tracing::info!(locality = %locality, canonical = %canonical, "Retrying with canonical locality");
            if let Some(coordinate) = self.attempt(&canonical).await {
                return Resolution::Found(coordinate);
            }
        }

        tracing::warn!(locality = %locality, sub_area = %sub_area, "Locality not resolved");
        Resolution::NotFound
    }

    async fn attempt(&self, query: &str) -> Option<Coordinate> {
        match self.geocoder.lookup(query).await {
            Ok(Some(hit)) => usable(&hit),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Geocoder lookup failed");
                None
            }
        }
    }
}

fn usable(hit: &GeoHit) -> Option<Coordinate> {
    if hit.level == PlaceLevel::Country {
        tracing::debug!(display_name = %hit.display_name, "Discarding country-level match");
        return None;
    }
    hit.coordinate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{country_hit, local_hit, MockGeocoder};

    #[test]
    fn test_canonical_locality_aliases() {
        assert_eq!(canonical_locality("CDMX"), "Ciudad de México");
        assert_eq!(canonical_locality(" México "), "Ciudad de México");
        assert_eq!(canonical_locality("mexico city"), "Ciudad de México");
        assert_eq!(canonical_locality("gdl"), "Guadalajara");
        assert_eq!(canonical_locality("MTY"), "Monterrey");
        assert_eq!(canonical_locality("Puebla "), "Puebla");
    }

    #[tokio::test]
    async fn test_direct_hit() {
        let geocoder = Arc::new(MockGeocoder::new().with_hit("Puebla", local_hit(19.04, -98.20)));
        let resolver = LocalityResolver::new(geocoder.clone());
        assert_eq!(
            resolver.resolve("Puebla", "").await,
            Resolution::Found(Coordinate::new(19.04, -98.20))
        );
        assert_eq!(geocoder.recorded_queries(), vec!["Puebla"]);
    }

    #[tokio::test]
    async fn test_sub_area_goes_first_in_query() {
        let geocoder = Arc::new(
            MockGeocoder::new().with_hit("Roma Norte, CDMX", local_hit(19.419, -99.162)),
        );
        let resolver = LocalityResolver::new(geocoder.clone());
        assert!(matches!(
            resolver.resolve("CDMX", "Roma Norte").await,
            Resolution::Found(_)
        ));
        assert_eq!(geocoder.recorded_queries(), vec!["Roma Norte, CDMX"]);
    }

    #[tokio::test]
    async fn test_alias_retry_after_country_match() {
        let geocoder = Arc::new(
            MockGeocoder::new()
                .with_hit("CDMX", country_hit())
                .with_hit("Ciudad de México", local_hit(19.4326, -99.1332)),
        );
        let resolver = LocalityResolver::new(geocoder.clone());
        assert_eq!(
            resolver.resolve("CDMX", "").await,
            Resolution::Found(Coordinate::new(19.4326, -99.1332))
        );
        assert_eq!(geocoder.recorded_queries(), vec!["CDMX", "Ciudad de México"]);
    }

    #[tokio::test]
    async fn test_alias_retry_after_geocoder_failure() {
        let geocoder = Arc::new(
            MockGeocoder::new()
                .with_failure("gdl")
                .with_hit("Guadalajara", local_hit(20.6597, -103.3496)),
        );
        let resolver = LocalityResolver::new(geocoder);
        assert!(matches!(resolver.resolve("gdl", "").await, Resolution::Found(_)));
    }

    #[tokio::test]
    async fn test_not_found_without_alias_does_not_retry() {
        let geocoder = Arc::new(MockGeocoder::new());
        let resolver = LocalityResolver::new(geocoder.clone());
        assert_eq!(resolver.resolve("Atlantis", "").await, Resolution::NotFound);
        assert_eq!(geocoder.recorded_queries().len(), 1);
    }

    #[tokio::test]
    async fn test_hit_without_coordinates_is_not_found() {
        let mut hit = local_hit(0.0, 0.0);
        hit.coordinate = None;
        let geocoder = Arc::new(MockGeocoder::new().with_hit("Springfield", hit));
        let resolver = LocalityResolver::new(geocoder);
        assert_eq!(resolver.resolve("Springfield", "").await, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_empty_locality_skips_lookup() {
        let geocoder = Arc::new(MockGeocoder::new());
        let resolver = LocalityResolver::new(geocoder.clone());
        assert_eq!(resolver.resolve("  ", "Roma").await, Resolution::NotFound);
        assert!(geocoder.recorded_queries().is_empty());
    }
}

//! Nominatim (OpenStreetMap) geocoder client

use super::{Coordinate, GeoError, GeoHit, Geocoder, PlaceLevel};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub struct NominatimClient {
    client: Client,
    base_url: String,
    email: String,
}

impl NominatimClient {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            email: email.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn lookup(&self, query: &str) -> Result<Option<GeoHit>, GeoError> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", "1"),
                ("email", self.email.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(query = %query, status = status.as_u16(), "Geocoder returned error status");
            return Err(GeoError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let hit = parse_search_response(&body)?;
        tracing::info!(
            query = %query,
            found = hit.is_some(),
            duration_ms = %start.elapsed().as_millis(),
            "Geocoder lookup completed"
        );
        Ok(hit)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    addresstype: String,
    #[serde(default, rename = "type")]
    place_type: String,
    #[serde(default)]
    display_name: String,
}

fn level_of(place: &NominatimPlace) -> PlaceLevel {
    match (place.addresstype.as_str(), place.place_type.as_str()) {
        ("country", _) | (_, "country") => PlaceLevel::Country,
        ("state" | "region" | "province", _) | (_, "state" | "region") => PlaceLevel::Region,
        _ => PlaceLevel::Local,
    }
}

/// Parse a `jsonv2` search response; the first element is the best match.
pub(crate) fn parse_search_response(body: &str) -> Result<Option<GeoHit>, GeoError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| GeoError::Malformed(e.to_string()))?;

    Ok(places.into_iter().next().map(|place| {
        let coordinate = match (&place.lat, &place.lon) {
            (Some(lat), Some(lon)) => match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            },
            _ => None,
        };
        GeoHit {
            coordinate,
            level: level_of(&place),
            display_name: place.display_name,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_city_hit() {
        let body = r#"[{"lat":"19.4326296","lon":"-99.1331785","addresstype":"city","type":"administrative","display_name":"Ciudad de México, México"}]"#;
        let hit = parse_search_response(body).unwrap().unwrap();
        assert_eq!(hit.level, PlaceLevel::Local);
        let coordinate = hit.coordinate.unwrap();
        assert!((coordinate.lat - 19.432_629_6).abs() < 1e-6);
    }

    #[test]
    fn test_parse_country_hit() {
        let body = r#"[{"lat":"23.65","lon":"-102.0","addresstype":"country","type":"administrative","display_name":"México"}]"#;
        let hit = parse_search_response(body).unwrap().unwrap();
        assert_eq!(hit.level, PlaceLevel::Country);
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let body = r#"[{"addresstype":"suburb","display_name":"Roma Norte"}]"#;
        let hit = parse_search_response(body).unwrap().unwrap();
        assert!(hit.coordinate.is_none());
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_search_response("[]").unwrap().is_none());
        assert!(matches!(
            parse_search_response("<html>rate limited</html>"),
            Err(GeoError::Malformed(_))
        ));
    }
}

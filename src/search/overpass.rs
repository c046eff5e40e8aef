//! Overpass (OpenStreetMap) map-data source

use super::{Amenity, MapPlace, MapSource, SourceError};
use crate::geo::Coordinate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

pub const MIN_RADIUS_M: u32 = 700;
pub const MAX_RADIUS_M: u32 = 6000;
const MAX_ELEMENTS: u32 = 120;

/// Live query around a point
#[derive(Debug, Clone, PartialEq)]
pub struct MapQuery {
    pub center: Coordinate,
    pub radius_m: u32,
    /// Regex alternation matched against `name`; empty for no filter
    pub name_pattern: String,
    /// Regex alternation matched against `cuisine`; empty for no filter
    pub cuisine_pattern: String,
    pub include_fast_food: bool,
    /// Also return venues tagged `diet:vegetarian` or `diet:vegan`
    pub diet: bool,
}

impl MapQuery {
    pub fn clamped_radius(&self) -> u32 {
        self.radius_m.clamp(MIN_RADIUS_M, MAX_RADIUS_M)
    }

    /// Render as Overpass QL
    pub fn to_ql(&self) -> String {
        let around = format!(
            "around:{},{},{}",
            self.clamped_radius(),
            self.center.lat,
            self.center.lon
        );
        let amenity = if self.include_fast_food {
            r#"["amenity"~"^(restaurant|fast_food|cafe)$"]"#
        } else {
            r#"["amenity"~"^(restaurant|cafe)$"]"#
        };

        let mut filters = Vec::new();
        if !self.cuisine_pattern.is_empty() {
            filters.push(format!(r#"["cuisine"~"{}",i]"#, escape_ql(&self.cuisine_pattern)));
        }
        if !self.name_pattern.is_empty() {
            filters.push(format!(r#"["name"~"{}",i]"#, escape_ql(&self.name_pattern)));
        }
        if filters.is_empty() {
            filters.push(String::new());
        }

        let mut ql = String::from("[out:json][timeout:30];\n(\n");
        for filter in &filters {
            for kind in ["node", "way", "relation"] {
                let _ = writeln!(ql, "  {kind}{amenity}{filter}({around});");
            }
        }
        if self.diet {
            for tag in ["diet:vegetarian", "diet:vegan"] {
                for kind in ["node", "way", "relation"] {
                    let _ = writeln!(ql, r#"  {kind}["{tag}"~"yes",i]({around});"#);
                }
            }
        }
        let _ = write!(ql, ");\nout center tags {MAX_ELEMENTS};");
        ql
    }
}

fn escape_ql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MapSource for OverpassClient {
    async fn query(&self, query: &MapQuery) -> Result<Vec<MapPlace>, SourceError> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.to_ql())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Map source returned error status");
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let places = parse_elements(&body)?;
        tracing::info!(
            radius_m = query.clamped_radius(),
            elements = places.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Map source query completed"
        );
        Ok(places)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

pub(crate) fn parse_elements(body: &str) -> Result<Vec<MapPlace>, SourceError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    Ok(response.elements.into_iter().map(to_place).collect())
}

fn tag_value<'a>(tags: &'a HashMap<String, String>, key: &str) -> &'a str {
    tags.get(key).map(String::as_str).unwrap_or_default().trim()
}

fn to_place(element: OverpassElement) -> MapPlace {
    let tags = &element.tags;
    let tag = |key: &str| tag_value(tags, key);

    let location = match (element.kind.as_str(), element.lat, element.lon, &element.center) {
        ("node", Some(lat), Some(lon), _) => Some(Coordinate::new(lat, lon)),
        (_, _, _, Some(center)) => Some(Coordinate::new(center.lat, center.lon)),
        _ => None,
    };

    let street = match (tag("addr:street"), tag("addr:housenumber")) {
        (street, "") => street.to_string(),
        (street, number) => format!("{street} {number}").trim().to_string(),
    };
    let suburb = match tag("addr:suburb") {
        "" => tag("addr:neighbourhood"),
        suburb => suburb,
    };
    let address = [street.as_str(), suburb, tag("addr:city")]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let website = [tag("website"), tag("contact:website")]
        .into_iter()
        .find(|w| !w.is_empty())
        .map(str::to_string);
    let has_contact = website.is_some() || !tag("phone").is_empty() || !tag("contact:phone").is_empty();

    MapPlace {
        id: format!("{}/{}", element.kind, element.id),
        name: tag("name").to_string(),
        amenity: Amenity::from_tag(tag("amenity")),
        cuisines: tag("cuisine")
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        address,
        location,
        website,
        has_contact,
        branded: ["brand", "brand:wikidata", "brand:wikipedia"]
            .into_iter()
            .any(|key| !tag(key).is_empty()),
    }
}

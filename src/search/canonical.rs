//! Curated venue dataset, loaded once at startup

use super::{Amenity, QualitySignal, Venue};
use crate::geo::Coordinate;
use crate::nlu::fold::fold;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One curated venue as stored on disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "lng", alias = "longitude")]
    pub lon: Option<f64>,
    /// Free text, possibly several tags joined by `;` or `,`
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub prestige: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub michelin: Option<String>,
    #[serde(default)]
    pub best_of_rank: Option<u32>,
    #[serde(default)]
    pub green_star: bool,
    #[serde(default)]
    pub website: Option<String>,
}

/// Record with a usable coordinate and a pre-folded cuisine for matching
#[derive(Debug, Clone)]
struct Entry {
    record: CanonicalRecord,
    location: Coordinate,
    folded_cuisine: String,
}

#[derive(Debug, Default)]
pub struct CanonicalDataset {
    entries: Vec<Entry>,
}

impl CanonicalDataset {
    /// Load the dataset from a JSON array.
    ///
    /// A missing file yields an empty dataset; unreadable or malformed files
    /// are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %shown, "Curated dataset not found; canonical tier disabled");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(DatasetError::Io {
                    path: shown,
                    source,
                })
            }
        };

        let records: Vec<CanonicalRecord> =
            serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
                path: shown.clone(),
                source,
            })?;
        let dataset = Self::from_records(records);
        tracing::info!(path = %shown, records = dataset.len(), "Curated dataset loaded");
        Ok(dataset)
    }

    /// Records without both coordinates are dropped.
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        let total = records.len();
        let entries: Vec<Entry> = records
            .into_iter()
            .filter_map(|record| {
                let location = Coordinate::new(record.lat?, record.lon?);
                Some(Entry {
                    folded_cuisine: fold(&record.cuisine),
                    location,
                    record,
                })
            })
            .collect();
        if entries.len() < total {
            tracing::debug!(skipped = total - entries.len(), "Skipped records without coordinates");
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records within `radius_km` of `center`, optionally filtered by a
    /// cuisine substring, ordered by prestige (highest first) then distance.
    pub fn find_top(
        &self,
        center: Coordinate,
        radius_km: f64,
        cuisine: &str,
        limit: usize,
    ) -> Vec<Venue> {
        let want = fold(cuisine.trim());
        let mut hits: Vec<(&Entry, f64)> = self
            .entries
            .iter()
            .map(|entry| (entry, center.distance_km(&entry.location)))
            .filter(|(_, distance)| *distance <= radius_km)
            .filter(|(entry, _)| want.is_empty() || entry.folded_cuisine.contains(&want))
            .collect();

        hits.sort_by(|(a, da), (b, db)| {
            b.record
                .prestige
                .total_cmp(&a.record.prestige)
                .then(da.total_cmp(db))
                .then_with(|| a.record.name.cmp(&b.record.name))
        });

        hits.into_iter()
            .take(limit)
            .map(|(entry, _)| entry.to_venue())
            .collect()
    }
}

impl Entry {
    fn to_venue(&self) -> Venue {
        let record = &self.record;
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| format!("{:.5},{:.5}", self.location.lat, self.location.lon));
        Venue {
            id: format!("canonical/{id}"),
            name: record.name.clone(),
            cuisines: record
                .cuisine
                .split([';', ',', '/'])
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            address: record.address.clone(),
            location: Some(self.location),
            amenity: Amenity::Restaurant,
            has_contact: record.website.is_some(),
            website: record.website.clone(),
            signal: QualitySignal::Prestige {
                score: record.prestige,
                michelin: record.michelin.clone(),
                best_of_rank: record.best_of_rank,
                green_star: record.green_star,
            },
        }
    }
}

//! Process configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATASET_PATH: &str = "./data/remy_restaurants_compact.json";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_NOMINATIM_EMAIL: &str = "remy@example.com";
const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_NLU_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IDLE_MINUTES: i64 = 15;
const DEFAULT_TTL_HOURS: i64 = 24;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub dataset_path: PathBuf,
    pub nominatim_url: String,
    pub nominatim_email: String,
    pub overpass_url: String,
    /// LLM-assisted NLU is enabled only when this is set
    pub openai_api_key: Option<String>,
    pub nlu_model: String,
    pub idle_after: chrono::Duration,
    pub session_ttl: chrono::Duration,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let text = |var: &str, default: &str| get(var).unwrap_or_else(|| default.to_string());

        let idle_after = span(
            &get,
            "REMY_SESSION_IDLE_MINUTES",
            DEFAULT_IDLE_MINUTES,
            chrono::Duration::try_minutes,
        )?;
        let session_ttl = span(
            &get,
            "REMY_SESSION_TTL_HOURS",
            DEFAULT_TTL_HOURS,
            chrono::Duration::try_hours,
        )?;
        let timeout_secs = number(&get, "REMY_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            port: number(&get, "PORT", DEFAULT_PORT)?,
            dataset_path: PathBuf::from(text("REMY_JSON_PATH", DEFAULT_DATASET_PATH)),
            nominatim_url: text("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            nominatim_email: text("NOMINATIM_EMAIL", DEFAULT_NOMINATIM_EMAIL),
            overpass_url: text("OVERPASS_URL", DEFAULT_OVERPASS_URL),
            openai_api_key: get("OPENAI_API_KEY"),
            nlu_model: text("REMY_NLU_MODEL", DEFAULT_NLU_MODEL),
            idle_after,
            session_ttl,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Sent on every outbound geocoder and map-data request
    pub fn user_agent(&self) -> String {
        format!(
            "Remy-Chef/{} ({})",
            env!("CARGO_PKG_VERSION"),
            self.nominatim_email
        )
    }
}

fn number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// Non-negative duration in the unit `to_duration` converts from
fn span(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
    to_duration: fn(i64) -> Option<chrono::Duration>,
) -> Result<chrono::Duration, ConfigError> {
    let amount = number(get, var, default)?;
    (amount >= 0)
        .then(|| to_duration(amount))
        .flatten()
        .ok_or_else(|| ConfigError::Invalid {
            var,
            value: amount.to_string(),
        })
}

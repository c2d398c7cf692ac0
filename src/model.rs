/// Core data types for the attire decider.
///
/// This module defines the shared domain model imported by all other modules:
/// the persisted weather snapshot, the derived report, and the error type
/// every pipeline stage returns. It contains no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locations::LocationKey;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One complete capture of weather fields for a location.
///
/// Produced only by a successful fetch + extraction, so every required field
/// is always populated. Field order here is the field order of the cache
/// record on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub captured_at: DateTime<Utc>,
    pub location_key: LocationKey,
    pub town: String,
    pub state: String,
    pub temperature_f: f64,
    pub sky: String,
    pub precipitation_in: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like_f: Option<f64>,
    /// Zip printed in the page title; may belong to a nearby station
    /// rather than the requested key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_zip: Option<String>,
}

impl WeatherSnapshot {
    /// `"<town>, <state>"`
    pub fn display_location(&self) -> String {
        format!("{}, {}", self.town, self.state)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Where the active snapshot of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Cache,
    Fresh,
}

/// Derived, ephemeral output of one pipeline run. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttireReport {
    pub location: String,
    pub location_key: LocationKey,
    pub captured_at: DateTime<Utc>,
    pub temperature_f: f64,
    pub sky: String,
    pub precipitation_in: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like_f: Option<f64>,
    pub advice: String,
    pub rain: bool,
    pub sunglasses: bool,
    pub origin: DataOrigin,
    /// Set when the refreshed snapshot could not be written back to the
    /// cache. The report itself is still valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while fetching, extracting, caching, or classifying
/// weather data.
#[derive(Debug, thiserror::Error)]
pub enum AttireError {
    /// The weather page could not be fetched (network, timeout, non-2xx).
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A required extraction marker was missing or its value unparseable.
    #[error("Malformed payload: {field}: {reason}")]
    MalformedPayload { field: &'static str, reason: String },

    /// Writing a refreshed snapshot to the cache failed.
    #[error("Cache persist failure: {0}")]
    CachePersistFailure(String),

    /// A stored cache record exists but cannot be decoded.
    #[error("Cache read corruption for {key}: {reason}")]
    CacheReadCorruption { key: String, reason: String },

    /// The requested location is not a usable zip code.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AttireError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        AttireError::MalformedPayload {
            field,
            reason: reason.into(),
        }
    }

    /// A short, actionable message for the console.
    pub fn user_message(&self) -> &'static str {
        match self {
            AttireError::SourceUnavailable(_) => {
                "Could not reach the weather source. Check your connection and try again."
            }
            AttireError::MalformedPayload { .. } => {
                "The weather page changed format or has no data for this zip code."
            }
            AttireError::CachePersistFailure(_) => {
                "Weather data could not be saved; it will be fetched again next time."
            }
            AttireError::CacheReadCorruption { .. } => {
                "Saved weather data was unreadable and will be refreshed."
            }
            AttireError::InvalidLocation(_) => "Enter a 5-digit U.S. zip code.",
            AttireError::Config(_) => "Check the configuration file and command-line options.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            captured_at: Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
            location_key: LocationKey::parse("08540").unwrap(),
            town: "Princeton".to_string(),
            state: "NJ".to_string(),
            temperature_f: 72.0,
            sky: "Clear".to_string(),
            precipitation_in: 0.0,
            humidity_pct: None,
            feels_like_f: None,
            station_zip: None,
        }
    }

    #[test]
    fn test_display_location_joins_town_and_state() {
        assert_eq!(snapshot().display_location(), "Princeton, NJ");
    }

    #[test]
    fn test_optional_fields_are_omitted_from_record() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(!json.contains("humidity_pct"));
        assert!(!json.contains("feels_like_f"));
        assert!(json.contains("\"location_key\":\"08540\""));
    }

    #[test]
    fn test_error_display_names_the_field() {
        let err = AttireError::malformed("precipitation", "marker not found");
        assert_eq!(
            err.to_string(),
            "Malformed payload: precipitation: marker not found"
        );
        assert!(err.user_message().contains("format"));
    }
}

/// Location keys and the sample location registry.
///
/// A `LocationKey` is the normalized 5-digit zip code used as the cache key
/// and as the query sent to the weather source. All other modules should
/// take a `LocationKey` rather than a raw string so that normalization
/// happens exactly once, at the edge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::AttireError;

/// Zip code used when none is given on the command line.
pub const DEFAULT_ZIP: &str = "08540";

// ---------------------------------------------------------------------------
// LocationKey
// ---------------------------------------------------------------------------

/// Normalized U.S. zip code. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationKey(String);

impl LocationKey {
    /// Normalizes user input into a key.
    ///
    /// Surrounding whitespace is dropped and a ZIP+4 suffix (`08540-1234`)
    /// is reduced to the 5-digit zip. Anything else that is not exactly five
    /// ASCII digits is rejected.
    pub fn parse(input: &str) -> Result<Self, AttireError> {
        let trimmed = input.trim();
        let zip = match trimmed.split_once('-') {
            Some((zip, plus4)) if plus4.len() == 4 && plus4.chars().all(|c| c.is_ascii_digit()) => {
                zip
            }
            Some(_) => return Err(AttireError::InvalidLocation(input.to_string())),
            None => trimmed,
        };

        if zip.len() != 5 || !zip.chars().all(|c| c.is_ascii_digit()) {
            return Err(AttireError::InvalidLocation(input.to_string()));
        }

        Ok(LocationKey(zip.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LocationKey {
    fn default() -> Self {
        LocationKey(DEFAULT_ZIP.to_string())
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LocationKey {
    type Error = AttireError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LocationKey::parse(&value)
    }
}

impl From<LocationKey> for String {
    fn from(key: LocationKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for LocationKey {
    type Err = AttireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationKey::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Sample locations
// ---------------------------------------------------------------------------

/// A zip code worth checking by hand, and what it exercises.
pub struct SampleLocation {
    pub zip: &'static str,
    pub name: &'static str,
    pub purpose: &'static str,
}

/// Zip codes that cover the interesting corners of the clothing table and
/// the page format. Used by `--samples` and by source verification.
pub static SAMPLE_LOCATIONS: &[SampleLocation] = &[
    SampleLocation {
        zip: "08540",
        name: "Princeton, NJ",
        purpose: "normal conditions",
    },
    SampleLocation {
        zip: "98101",
        name: "Seattle, WA",
        purpose: "rain",
    },
    SampleLocation {
        zip: "33101",
        name: "Miami, FL",
        purpose: "heat",
    },
    SampleLocation {
        zip: "60290",
        name: "Chicago, IL",
        purpose: "cool",
    },
    SampleLocation {
        zip: "04736",
        name: "Caribou, ME",
        purpose: "cold",
    },
    SampleLocation {
        zip: "96761",
        name: "Lahaina, HI",
        purpose: "different time of day",
    },
    SampleLocation {
        zip: "12345",
        name: "Schenectady, NY",
        purpose: "unusual zip code",
    },
];

/// Keys for every sample location. Entries that fail to parse are skipped;
/// the registry test guarantees there are none.
pub fn sample_keys() -> Vec<LocationKey> {
    SAMPLE_LOCATIONS
        .iter()
        .filter_map(|s| LocationKey::parse(s.zip).ok())
        .collect()
}

/// Looks up a sample location by zip. Returns `None` if not registered.
pub fn find_sample(zip: &str) -> Option<&'static SampleLocation> {
    SAMPLE_LOCATIONS.iter().find(|s| s.zip == zip)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

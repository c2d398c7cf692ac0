//! Directory-backed snapshot store.
//!
//! Each location key gets one JSON record, `<dir>/<zip>.json`:
//!
//! ```json
//! {
//!   "captured_at": "2024-05-01T13:00:00Z",
//!   "location_key": "08540",
//!   "town": "Princeton",
//!   "state": "NJ",
//!   "temperature_f": 72.0,
//!   "sky": "Clear",
//!   "precipitation_in": 0.0,
//!   "humidity_pct": 65.0,
//!   "feels_like_f": 74.0
//! }
//! ```
//!
//! Optional fields are omitted when absent. Writes go to a temp file in the
//! same directory which is then renamed over the record.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::cache::CacheStore;
use crate::locations::LocationKey;
use crate::model::{AttireError, WeatherSnapshot};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// The directory is created lazily on the first `put`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a key.
    pub fn record_path(&self, key: &LocationKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &LocationKey) -> Result<Option<WeatherSnapshot>, AttireError> {
        let path = self.record_path(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AttireError::CacheReadCorruption {
                    key: key.to_string(),
                    reason: format!("unreadable {}: {}", path.display(), e),
                });
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| AttireError::CacheReadCorruption {
                key: key.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }

    fn put(&self, key: &LocationKey, snapshot: &WeatherSnapshot) -> Result<(), AttireError> {
        let persist_err = |what: &str, e: &dyn std::fmt::Display| {
            AttireError::CachePersistFailure(format!("{} for {}: {}", what, key, e))
        };

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| persist_err("create cache directory", &e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| persist_err("create temp record", &e))?;
        serde_json::to_writer_pretty(&mut tmp, snapshot)
            .map_err(|e| persist_err("serialize record", &e))?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| persist_err("write record", &e))?;

        tmp.persist(self.record_path(key))
            .map_err(|e| persist_err("replace record", &e.error))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Replay of saved weather pages.
///
/// When the live site is unavailable (or for offline development), pages
/// saved as `<dir>/<zip>.html` are served instead of fetching over HTTP.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::ingest::{RawPayload, WeatherSource};
use crate::locations::LocationKey;
use crate::model::AttireError;

/// Configuration for serving saved pages
pub struct ReplaySource {
    /// Directory holding `<zip>.html` files
    pub dir: PathBuf,
    /// Capture time to stamp on every page. `None` uses the file's
    /// modification time.
    pub captured_at: Option<DateTime<Utc>>,
}

impl ReplaySource {
    /// Serve pages from `dir`, stamped with their modification times.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            captured_at: None,
        }
    }

    /// Serve pages as if they were all captured at `captured_at`.
    pub fn at(dir: impl Into<PathBuf>, captured_at: DateTime<Utc>) -> Self {
        Self {
            dir: dir.into(),
            captured_at: Some(captured_at),
        }
    }

    /// Path of the saved page for a zip code.
    pub fn page_path(&self, key: &LocationKey) -> PathBuf {
        self.dir.join(format!("{}.html", key))
    }

    fn capture_time(&self, path: &Path) -> DateTime<Utc> {
        if let Some(fixed) = self.captured_at {
            return fixed;
        }
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now())
    }
}

impl WeatherSource for ReplaySource {
    fn fetch(&self, key: &LocationKey) -> Result<RawPayload, AttireError> {
        let path = self.page_path(key);
        tracing::debug!(component = "source", zip = %key, path = %path.display(), "replaying saved page");

        let body = std::fs::read_to_string(&path).map_err(|e| {
            AttireError::SourceUnavailable(format!(
                "no saved page at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(RawPayload {
            body,
            captured_at: self.capture_time(&path),
        })
    }
}

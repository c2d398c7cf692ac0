//! Fetch-cache-extract-classify orchestration.
//!
//! Per request for a location key:
//!   1. read the cached snapshot (an unreadable record counts as absent)
//!   2. evaluate freshness at `now`
//!   3. if stale: fetch, extract, write back (best effort), use the new snapshot
//!   4. if fresh: use the cached snapshot
//!   5. classify the temperature and derive the rain / sunglasses flags
//!
//! Fetch and extraction failures abort the request and leave the cache
//! untouched. A failed write-back does not: the report is produced from the
//! snapshot just extracted and carries a warning instead.
//!
//! Requests for the same key are serialized by a per-key lock held from the
//! cache read through the write-back, so concurrent callers trigger at most
//! one fetch; the others find the fresh record when they get the lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::cache::CacheStore;
use crate::ingest::extract::extract_snapshot;
use crate::ingest::WeatherSource;
use crate::locations::LocationKey;
use crate::logging::{log_failure, Component};
use crate::model::{AttireError, AttireReport, DataOrigin, WeatherSnapshot};
use crate::policy::clothing::{classify, ClothingThresholds};
use crate::policy::freshness::{evaluate_at, Freshness, DEFAULT_MAX_AGE_MINUTES};

/// Sky label that calls for sunglasses. Matched exactly.
pub const CLEAR_SKY: &str = "Clear";

pub struct AttirePipeline<C, S> {
    cache: C,
    source: S,
    thresholds: ClothingThresholds,
    max_age: Duration,
    key_locks: Mutex<HashMap<LocationKey, Arc<Mutex<()>>>>,
}

impl<C: CacheStore, S: WeatherSource> AttirePipeline<C, S> {
    /// Pipeline with default thresholds and a 30 minute tolerance.
    pub fn new(cache: C, source: S) -> Self {
        Self {
            cache,
            source,
            thresholds: ClothingThresholds::default(),
            max_age: Duration::minutes(DEFAULT_MAX_AGE_MINUTES),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ClothingThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn thresholds(&self) -> &ClothingThresholds {
        &self.thresholds
    }

    /// Runs the pipeline against the real clock.
    pub fn run(&self, key: &LocationKey) -> Result<AttireReport, AttireError> {
        self.run_at(key, Utc::now())
    }

    /// Runs the pipeline as if the current time were `now`.
    pub fn run_at(&self, key: &LocationKey, now: DateTime<Utc>) -> Result<AttireReport, AttireError> {
        self.execute(key, now, false)
    }

    /// Skips the freshness check and always fetches. The new snapshot is
    /// still written back.
    pub fn refresh_at(&self, key: &LocationKey, now: DateTime<Utc>) -> Result<AttireReport, AttireError> {
        self.execute(key, now, true)
    }

    fn execute(
        &self,
        key: &LocationKey,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<AttireReport, AttireError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock();

        let cached = if force { None } else { self.load_cached(key) };

        if !force {
            match evaluate_at(cached.as_ref(), key, now, self.max_age) {
                Freshness::Fresh => {
                    if let Some(snapshot) = cached {
                        tracing::debug!(component = %Component::Pipeline, zip = %key, "using cached snapshot");
                        return Ok(build_report(&snapshot, DataOrigin::Cache, None, &self.thresholds));
                    }
                }
                Freshness::Stale(reason) => {
                    tracing::info!(component = %Component::Pipeline, zip = %key, ?reason, "cached snapshot is stale, refreshing");
                }
            }
        }

        let (snapshot, cache_warning) = self.refresh(key)?;
        Ok(build_report(
            &snapshot,
            DataOrigin::Fresh,
            cache_warning,
            &self.thresholds,
        ))
    }

    fn key_lock(&self, key: &LocationKey) -> Arc<Mutex<()>> {
        self.key_locks
            .lock()
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn load_cached(&self, key: &LocationKey) -> Option<WeatherSnapshot> {
        match self.cache.get(key) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log_failure(Component::Cache, Some(key), "cache read", &e);
                None
            }
        }
    }

    /// Fetches and extracts a new snapshot, then writes it back.
    ///
    /// Returns the write-back failure message alongside the snapshot rather
    /// than failing the request.
    fn refresh(&self, key: &LocationKey) -> Result<(WeatherSnapshot, Option<String>), AttireError> {
        let payload = self.source.fetch(key).inspect_err(|e| {
            log_failure(Component::Source, Some(key), "fetch", e);
        })?;

        let snapshot = extract_snapshot(key, &payload).inspect_err(|e| {
            log_failure(Component::Extract, Some(key), "extraction", e);
        })?;

        let cache_warning = match self.cache.put(key, &snapshot) {
            Ok(()) => {
                tracing::debug!(component = %Component::Cache, zip = %key, "snapshot stored");
                None
            }
            Err(e) => {
                log_failure(Component::Cache, Some(key), "cache write", &e);
                Some(e.to_string())
            }
        };

        Ok((snapshot, cache_warning))
    }
}

/// Classifies a snapshot and assembles the report.
pub fn build_report(
    snapshot: &WeatherSnapshot,
    origin: DataOrigin,
    cache_warning: Option<String>,
    thresholds: &ClothingThresholds,
) -> AttireReport {
    let advice = classify(snapshot.temperature_f, thresholds);

    AttireReport {
        location: snapshot.display_location(),
        location_key: snapshot.location_key.clone(),
        captured_at: snapshot.captured_at,
        temperature_f: snapshot.temperature_f,
        sky: snapshot.sky.clone(),
        precipitation_in: snapshot.precipitation_in,
        humidity_pct: snapshot.humidity_pct,
        feels_like_f: snapshot.feels_like_f,
        advice: advice.label().to_string(),
        rain: snapshot.precipitation_in > 0.0,
        sunglasses: snapshot.sky == CLEAR_SKY,
        origin,
        cache_warning,
    }
}

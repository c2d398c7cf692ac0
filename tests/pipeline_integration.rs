/// Pipeline Integration Tests
///
/// Runs the full fetch-extract-cache-classify flow against a scripted
/// source and a real directory-backed cache in a temp dir. No network.
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

use attire_decider::cache::{CacheStore, FileCacheStore};
use attire_decider::ingest::replay::ReplaySource;
use attire_decider::ingest::{RawPayload, WeatherSource};
use attire_decider::{AttireError, AttirePipeline, DataOrigin, LocationKey, WeatherSnapshot};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
}

fn princeton() -> LocationKey {
    LocationKey::parse("08540").unwrap()
}

fn weather_page(title: &str, precip: Option<&str>) -> String {
    let precip = precip
        .map(|p| {
            format!(
                "<div id=\"precip_today\"><span class=\"wx-value\">{}</span> in</div>",
                p
            )
        })
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html><html><head>\n\
         <title>Weather Forecast</title>\n\
         <meta property=\"og:title\" content=\"{}\" />\n\
         </head><body>{}</body></html>",
        title, precip
    )
}

/// Returns a fixed page, stamped with a fixed capture time, counting calls.
struct ScriptedSource {
    body: String,
    captured_at: DateTime<Utc>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(body: String, captured_at: DateTime<Utc>) -> Self {
        Self {
            body,
            captured_at,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WeatherSource for ScriptedSource {
    fn fetch(&self, _key: &LocationKey) -> Result<RawPayload, AttireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawPayload {
            body: self.body.clone(),
            captured_at: self.captured_at,
        })
    }
}

fn stored(zip: &str, temp: f64, captured_at: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        captured_at,
        location_key: LocationKey::parse(zip).unwrap(),
        town: "Seattle".to_string(),
        state: "WA".to_string(),
        temperature_f: temp,
        sky: "Light Rain".to_string(),
        precipitation_in: 0.3,
        humidity_pct: Some(90.0),
        feels_like_f: None,
        station_zip: None,
    }
}

#[test]
fn test_princeton_clear_day_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(
        weather_page("Princeton, NJ (08540) | 72&deg;F | Clear", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source);

    let report = pipeline.run_at(&princeton(), fixed_now()).expect("pipeline should succeed");

    assert_eq!(report.location, "Princeton, NJ");
    assert_eq!(report.temperature_f, 72.0);
    assert_eq!(report.advice, "T-Shirt, Shorts");
    assert!(!report.rain);
    assert!(report.sunglasses);
    assert_eq!(report.origin, DataOrigin::Fresh);
    assert!(report.cache_warning.is_none());

    let record = pipeline.cache().get(&princeton()).unwrap().expect("record persisted");
    assert_eq!(record.captured_at, fixed_now());
    assert_eq!(record.station_zip.as_deref(), Some("08540"));
    assert!(dir.path().join("08540.json").exists());
}

#[test]
fn test_second_run_within_tolerance_uses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 45°F | Overcast", Some("0.10")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source);

    let first = pipeline.run_at(&princeton(), fixed_now()).unwrap();
    let second = pipeline
        .run_at(&princeton(), fixed_now() + Duration::minutes(30))
        .unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(first.origin, DataOrigin::Fresh);
    assert_eq!(second.origin, DataOrigin::Cache);
    assert_eq!(second.advice, "Long Pants, Outer Layer and/or Light Jacket");
    assert!(second.rain);
}

#[test]
fn test_run_after_tolerance_refetches() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 45°F | Overcast", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source);

    pipeline.run_at(&princeton(), fixed_now()).unwrap();
    let later = pipeline
        .run_at(&princeton(), fixed_now() + Duration::minutes(31))
        .unwrap();

    assert_eq!(source.calls(), 2);
    assert_eq!(later.origin, DataOrigin::Fresh);
}

#[test]
fn test_shorter_tolerance_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 45°F | Overcast", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source)
        .with_max_age(Duration::minutes(5));

    pipeline.run_at(&princeton(), fixed_now()).unwrap();
    pipeline
        .run_at(&princeton(), fixed_now() + Duration::minutes(6))
        .unwrap();

    assert_eq!(source.calls(), 2);
}

#[test]
fn test_missing_precipitation_marker_leaves_cache_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCacheStore::new(dir.path());
    let old = stored("08540", 20.0, fixed_now() - Duration::hours(2));
    store.put(&princeton(), &old).unwrap();

    let source = ScriptedSource::new(
        weather_page("Princeton, NJ (08540) | 72°F | Clear", None),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(store, &source);

    let err = pipeline.run_at(&princeton(), fixed_now()).unwrap_err();
    assert!(
        matches!(err, AttireError::MalformedPayload { field: "precipitation", .. }),
        "got {:?}",
        err
    );
    assert_eq!(pipeline.cache().get(&princeton()).unwrap(), Some(old));
}

#[test]
fn test_malformed_page_with_empty_cache_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new("<html><body>Service Unavailable</body></html>".into(), fixed_now());
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source);

    assert!(pipeline.run_at(&princeton(), fixed_now()).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_record_for_another_location_is_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCacheStore::new(dir.path());

    // Seattle data sitting under Princeton's record path.
    let seattle = stored("98101", 50.0, fixed_now());
    std::fs::write(
        store.record_path(&princeton()),
        serde_json::to_string(&seattle).unwrap(),
    )
    .unwrap();

    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 72°F | Clear", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(store, &source);

    let report = pipeline.run_at(&princeton(), fixed_now()).unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(report.location, "Princeton, NJ");
    assert_eq!(
        pipeline.cache().get(&princeton()).unwrap().unwrap().location_key,
        princeton()
    );
}

#[test]
fn test_corrupt_record_is_treated_as_absent_and_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCacheStore::new(dir.path());
    std::fs::write(store.record_path(&princeton()), "{\"captured_at\": ").unwrap();

    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 72°F | Clear", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(store, &source);

    let report = pipeline.run_at(&princeton(), fixed_now()).unwrap();
    assert_eq!(report.origin, DataOrigin::Fresh);
    assert!(pipeline.cache().get(&princeton()).unwrap().is_some());
}

#[test]
fn test_persist_failure_still_reports_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, "not a directory").unwrap();

    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 72°F | Clear", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(&blocker), &source);

    let report = pipeline.run_at(&princeton(), fixed_now()).expect("report despite cache failure");
    assert_eq!(report.advice, "T-Shirt, Shorts");
    let warning = report.cache_warning.expect("warning set");
    assert!(warning.contains("08540"), "warning: {}", warning);
}

#[test]
fn test_concurrent_callers_share_one_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(
        weather_page("Princeton, NJ | 72°F | Clear", Some("0.00")),
        fixed_now(),
    );
    let pipeline = AttirePipeline::new(FileCacheStore::new(dir.path()), &source);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| scope.spawn(|| pipeline.run_at(&princeton(), fixed_now())))
            .collect();
        for handle in handles {
            let report = handle.join().unwrap().expect("every caller gets a report");
            assert_eq!(report.advice, "T-Shirt, Shorts");
        }
    });

    assert_eq!(source.calls(), 1);
}

#[test]
fn test_replayed_pages_drive_the_pipeline() {
    let pages = tempfile::tempdir().unwrap();
    std::fs::write(
        pages.path().join("98101.html"),
        weather_page("Seattle, WA (98101) | 51&deg;F | Light Rain", Some("0.42")),
    )
    .unwrap();
    let cache = tempfile::tempdir().unwrap();

    let pipeline = AttirePipeline::new(
        FileCacheStore::new(cache.path()),
        ReplaySource::at(pages.path(), fixed_now()),
    );

    let seattle = LocationKey::parse("98101").unwrap();
    let report = pipeline.run_at(&seattle, fixed_now()).unwrap();
    assert_eq!(report.advice, "Long Pants, Light Jacket");
    assert!(report.rain);
    assert!(!report.sunglasses);

    let err = pipeline.run_at(&princeton(), fixed_now()).unwrap_err();
    assert!(matches!(err, AttireError::SourceUnavailable(_)));
}

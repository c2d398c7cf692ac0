/// Cached snapshot freshness.
///
/// Weather pages change slowly, so a snapshot captured recently for the same
/// zip code is reused instead of hitting the network again. This module
/// decides when that reuse is allowed.
///
/// # Clock injection
/// `evaluate_at` takes `now` as a parameter; callers pass `Utc::now()`.

use chrono::{DateTime, Duration, Utc};

use crate::locations::LocationKey;
use crate::model::WeatherSnapshot;

/// Default tolerance for the age of cached data.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 30;

/// Why a cached snapshot cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// Nothing cached for this key (or the record was unreadable).
    Missing,
    /// The cache holds data fetched for a different zip code.
    LocationMismatch { cached: LocationKey },
    /// The snapshot is older than the tolerance.
    Expired { age: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale(_))
    }
}

/// Decides whether `cached` can serve a request for `requested` at `now`.
///
/// Staleness is defined as strictly greater than the tolerance:
///   age > max_age  →  stale
///   age == max_age →  fresh
///
/// A snapshot stamped in the future (clock skew) has negative age and is
/// treated as fresh.
pub fn evaluate_at(
    cached: Option<&WeatherSnapshot>,
    requested: &LocationKey,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Freshness {
    let Some(snapshot) = cached else {
        return Freshness::Stale(StaleReason::Missing);
    };

    if &snapshot.location_key != requested {
        return Freshness::Stale(StaleReason::LocationMismatch {
            cached: snapshot.location_key.clone(),
        });
    }

    let age = now - snapshot.captured_at;
    if age > max_age {
        return Freshness::Stale(StaleReason::Expired { age });
    }

    Freshness::Fresh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(zip: &str) -> LocationKey {
        LocationKey::parse(zip).unwrap()
    }

    fn snapshot_at(zip: &str, captured_at: DateTime<Utc>) -> WeatherSnapshot {
        WeatherSnapshot {
            captured_at,
            location_key: key(zip),
            town: "Princeton".to_string(),
            state: "NJ".to_string(),
            temperature_f: 72.0,
            sky: "Clear".to_string(),
            precipitation_in: 0.0,
            humidity_pct: Some(40.0),
            feels_like_f: None,
            station_zip: None,
        }
    }

    /// A fixed "now" used across all tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn max_age() -> Duration {
        Duration::minutes(DEFAULT_MAX_AGE_MINUTES)
    }

    // --- Fresh --------------------------------------------------------------

    #[test]
    fn test_snapshot_5_minutes_old_is_fresh() {
        let snap = snapshot_at("08540", fixed_now() - Duration::minutes(5));
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert_eq!(result, Freshness::Fresh);
    }

    #[test]
    fn test_snapshot_exactly_at_tolerance_is_fresh() {
        // Age == tolerance should NOT be stale (strictly greater than).
        let snap = snapshot_at("08540", fixed_now() - Duration::minutes(30));
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert_eq!(
            result,
            Freshness::Fresh,
            "snapshot exactly 30 min old should be fresh, staleness is strictly greater than"
        );
    }

    #[test]
    fn test_snapshot_from_the_future_is_fresh() {
        let snap = snapshot_at("08540", fixed_now() + Duration::minutes(10));
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert!(!result.is_stale());
    }

    // --- Stale --------------------------------------------------------------

    #[test]
    fn test_snapshot_one_second_past_tolerance_is_stale() {
        let snap = snapshot_at(
            "08540",
            fixed_now() - Duration::minutes(30) - Duration::seconds(1),
        );
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert_eq!(
            result,
            Freshness::Stale(StaleReason::Expired {
                age: Duration::seconds(30 * 60 + 1)
            })
        );
    }

    #[test]
    fn test_missing_snapshot_is_stale() {
        let result = evaluate_at(None, &key("08540"), fixed_now(), max_age());
        assert_eq!(result, Freshness::Stale(StaleReason::Missing));
    }

    #[test]
    fn test_different_location_is_stale_even_if_brand_new() {
        let snap = snapshot_at("98101", fixed_now() - Duration::seconds(1));
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert_eq!(
            result,
            Freshness::Stale(StaleReason::LocationMismatch {
                cached: key("98101")
            })
        );
    }

    #[test]
    fn test_location_mismatch_is_reported_before_age() {
        let snap = snapshot_at("98101", fixed_now() - Duration::hours(5));
        let result = evaluate_at(Some(&snap), &key("08540"), fixed_now(), max_age());
        assert!(matches!(
            result,
            Freshness::Stale(StaleReason::LocationMismatch { .. })
        ));
    }

    // --- Tolerance variation ------------------------------------------------

    #[test]
    fn test_same_snapshot_stale_under_tight_tolerance_not_under_loose() {
        let snap = snapshot_at("08540", fixed_now() - Duration::minutes(30));
        let tight = evaluate_at(Some(&snap), &key("08540"), fixed_now(), Duration::minutes(20));
        let loose = evaluate_at(Some(&snap), &key("08540"), fixed_now(), Duration::minutes(60));
        assert!(tight.is_stale(), "30-min-old snapshot is stale under a 20-min tolerance");
        assert!(!loose.is_stale(), "30-min-old snapshot is fresh under a 60-min tolerance");
    }

    #[test]
    fn test_zero_tolerance_refreshes_anything_older_than_now() {
        let snap = snapshot_at("08540", fixed_now() - Duration::seconds(1));
        assert!(evaluate_at(Some(&snap), &key("08540"), fixed_now(), Duration::zero()).is_stale());
        let same_instant = snapshot_at("08540", fixed_now());
        assert!(!evaluate_at(Some(&same_instant), &key("08540"), fixed_now(), Duration::zero()).is_stale());
    }
}

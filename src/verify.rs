//! Source Verification Module
//!
//! Runs every sample location through a `WeatherSource` and the extractor
//! to see which locations still produce usable pages. Use this after the
//! site changes its markup, or before trusting a new zip code.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ingest::extract::extract_snapshot;
use crate::ingest::WeatherSource;
use crate::locations::{LocationKey, SampleLocation};
use crate::logging::{log_failure, log_verification_summary, Component};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<LocationVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

impl VerificationSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.working as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationVerification {
    pub zip: String,
    pub name: String,
    pub purpose: String,
    pub status: VerificationStatus,
    pub page_fetched: bool,
    pub fields_available: Vec<String>,
    pub fields_missing: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    /// Required and optional fields all extracted
    Success,
    /// Required fields extracted, some optional ones missing
    PartialSuccess,
    Failed,
}

// ============================================================================
// Per-location verification
// ============================================================================

pub fn verify_location<S: WeatherSource>(source: &S, sample: &SampleLocation) -> LocationVerification {
    let mut result = LocationVerification {
        zip: sample.zip.to_string(),
        name: sample.name.to_string(),
        purpose: sample.purpose.to_string(),
        status: VerificationStatus::Failed,
        page_fetched: false,
        fields_available: Vec::new(),
        fields_missing: Vec::new(),
        error_message: None,
    };

    let key = match LocationKey::parse(sample.zip) {
        Ok(key) => key,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };

    let payload = match source.fetch(&key) {
        Ok(payload) => payload,
        Err(e) => {
            log_failure(Component::Source, Some(&key), "verification fetch", &e);
            result.error_message = Some(format!("Fetch failed: {}", e));
            return result;
        }
    };
    result.page_fetched = true;

    let snapshot = match extract_snapshot(&key, &payload) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log_failure(Component::Extract, Some(&key), "verification extraction", &e);
            result.error_message = Some(format!("Extraction failed: {}", e));
            return result;
        }
    };

    result.fields_available = ["town", "state", "temperature", "sky", "precipitation"]
        .iter()
        .map(|f| f.to_string())
        .collect();

    for (field, present) in [
        ("humidity", snapshot.humidity_pct.is_some()),
        ("feels_like", snapshot.feels_like_f.is_some()),
        ("station_zip", snapshot.station_zip.is_some()),
    ] {
        if present {
            result.fields_available.push(field.to_string());
        } else {
            result.fields_missing.push(field.to_string());
        }
    }

    result.status = if result.fields_missing.is_empty() {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    };

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

/// Verifies each sample in turn and prints one progress line per location.
pub fn run_verification<S: WeatherSource>(source: &S, samples: &[SampleLocation]) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::new(),
        summary: VerificationSummary {
            total: samples.len(),
            ..VerificationSummary::default()
        },
    };

    println!("Verifying sample locations...");
    for sample in samples {
        print!("  {} {} ... ", sample.zip, sample.name);
        let result = verify_location(source, sample);

        match result.status {
            VerificationStatus::Success => {
                println!("OK");
                report.summary.working += 1;
            }
            VerificationStatus::PartialSuccess => {
                println!("Partial (missing: {:?})", result.fields_missing);
                report.summary.working += 1;
            }
            VerificationStatus::Failed => {
                println!("FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"));
                report.summary.failed += 1;
            }
        }

        report.results.push(result);
    }

    log_verification_summary(
        report.summary.total,
        report.summary.working,
        report.summary.failed,
    );

    report
}

pub fn print_summary(report: &VerificationReport) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("VERIFICATION SUMMARY");
    println!("{}", rule);
    println!();
    println!(
        "Sample Locations: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );
    println!();
    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        report.summary.success_rate(),
        report.summary.working,
        report.summary.total
    );
    println!("{}", rule);
}

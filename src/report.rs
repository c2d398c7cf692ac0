//! Rendering of an `AttireReport` for the terminal or as JSON.

use std::fmt::Write as _;

use crate::model::{AttireError, AttireReport};
use crate::policy::clothing::ClothingThresholds;

/// Custom preference table, printed when the user supplied cold/warm values.
pub fn render_preferences(thresholds: &ClothingThresholds) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your temperature preferences:");
    for (name, value) in [
        ("Hot", thresholds.hot),
        ("Warm", thresholds.warm),
        ("Cool", thresholds.cool),
        ("Cold", thresholds.cold),
        ("Freezing", thresholds.freezing),
    ] {
        let _ = writeln!(out, "  {:<10}{:.1}", format!("{}:", name), value);
    }
    out
}

/// Human-readable report, one fact per line.
///
/// ```text
/// Weather for Princeton, NJ
/// Current Temperature is: 72.0 degrees Fahrenheit
/// Sky is Clear
/// Rain is 0.00 in.
/// Consider wearing: T-Shirt, Shorts
/// Bring sunglasses
/// ```
pub fn render_text(report: &AttireReport, preferences: Option<&ClothingThresholds>) -> String {
    let mut out = String::new();

    if let Some(thresholds) = preferences {
        out.push_str(&render_preferences(thresholds));
        out.push('\n');
    }

    let _ = writeln!(out, "Weather for {}", report.location);
    let _ = writeln!(
        out,
        "Current Temperature is: {:.1} degrees Fahrenheit",
        report.temperature_f
    );
    if let Some(feels_like) = report.feels_like_f {
        let _ = writeln!(out, "Feels like: {:.1} degrees Fahrenheit", feels_like);
    }
    if let Some(humidity) = report.humidity_pct {
        let _ = writeln!(out, "Humidity: {:.0}%", humidity);
    }
    let _ = writeln!(out, "Sky is {}", report.sky);
    let _ = writeln!(out, "Rain is {:.2} in.", report.precipitation_in);
    let _ = writeln!(out, "Consider wearing: {}", report.advice);

    if report.rain {
        let _ = writeln!(out, "Bring an umbrella");
    }
    if report.sunglasses {
        let _ = writeln!(out, "Bring sunglasses");
    }

    if let Some(warning) = &report.cache_warning {
        let _ = writeln!(out, "Warning: weather could not be cached ({})", warning);
    }

    out
}

pub fn render_json(report: &AttireReport) -> Result<String, AttireError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| AttireError::Config(format!("cannot serialize report: {}", e)))
}

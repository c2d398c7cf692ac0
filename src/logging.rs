/// Structured logging for the attire decider
///
/// Installs a `tracing` subscriber with a console layer (stderr, so the
/// report on stdout stays clean) and an optional append-only file layer.
/// Events carry a `component` field and, where relevant, the `zip` being
/// processed. Failures are classified before logging so that expected
/// conditions (a corrupt cache record that will be refetched) stay quiet
/// while unexpected ones surface as errors.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use crate::locations::LocationKey;
use crate::model::AttireError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level `{}`", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Source,
    Extract,
    Cache,
    Pipeline,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Source => write!(f, "source"),
            Component::Extract => write!(f, "extract"),
            Component::Cache => write!(f, "cache"),
            Component::Pipeline => write!(f, "pipeline"),
            Component::System => write!(f, "system"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - self-healing or caused by user input
    Expected,
    /// Unexpected failure - indicates an outage, a bug, or a broken environment
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a pipeline failure.
pub fn classify_failure(err: &AttireError) -> FailureType {
    match err {
        // The next fetch rewrites the record.
        AttireError::CacheReadCorruption { .. } => FailureType::Expected,
        AttireError::InvalidLocation(_) => FailureType::Expected,
        // A 404 usually means the zip has no page rather than an outage.
        AttireError::SourceUnavailable(msg) if msg.contains("404") => FailureType::Unknown,
        AttireError::SourceUnavailable(_) => FailureType::Unexpected,
        // Either the site changed its markup or this zip has no reporting station.
        AttireError::MalformedPayload { .. } => FailureType::Unknown,
        AttireError::CachePersistFailure(_) => FailureType::Unexpected,
        AttireError::Config(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, overrides `min_level`. The console layer prints
/// timestamps only when `console_timestamps` is set; the file layer always
/// does and never uses ANSI colors.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Result<(), AttireError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_filter()));

    let console_plain = (!console_timestamps).then(|| {
        tfmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });
    let console_timed = console_timestamps.then(|| {
        tfmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AttireError::Config(format!(
                        "cannot open log file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            Some(
                tfmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_plain)
        .with(console_timed)
        .with(file_layer)
        .try_init()
        .map_err(|e| AttireError::Config(format!("logger already installed: {}", e)))
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a failure at the level its classification calls for.
pub fn log_failure(
    component: Component,
    zip: Option<&LocationKey>,
    operation: &str,
    err: &AttireError,
) {
    let failure_type = classify_failure(err);
    let zip = zip.map(|k| k.as_str()).unwrap_or("-");

    match failure_type {
        FailureType::Expected => {
            tracing::debug!(component = %component, zip, "{} failed [{}]: {}", operation, failure_type, err)
        }
        FailureType::Unexpected => {
            tracing::error!(component = %component, zip, "{} failed [{}]: {}", operation, failure_type, err)
        }
        FailureType::Unknown => {
            tracing::warn!(component = %component, zip, "{} failed [{}]: {}", operation, failure_type, err)
        }
    }
}

// ---------------------------------------------------------------------------
// Verification Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a verification sweep
pub fn log_verification_summary(total: usize, successful: usize, failed: usize) {
    let component = Component::Source;
    if failed == 0 {
        tracing::info!(component = %component, "Verification complete: {}/{} successful", successful, total);
    } else if successful == 0 {
        tracing::error!(component = %component, "Verification complete: 0/{} successful, {} failed", total, failed);
    } else {
        tracing::warn!(component = %component, "Verification complete: {}/{} successful, {} failed", successful, total, failed);
    }
}

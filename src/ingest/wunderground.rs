/// Weather Underground current-conditions page client.
///
/// Fetches the forecast page for a zip code over blocking HTTP. The body is
/// returned untouched; field extraction happens in `ingest::extract`.
///
/// Page: http://www.wunderground.com/cgi-bin/findweather/getForecast?query=<zip>

use std::time::Duration;

use chrono::Utc;

use crate::ingest::{RawPayload, WeatherSource};
use crate::locations::LocationKey;
use crate::model::AttireError;

pub const DEFAULT_BASE_URL: &str =
    "http://www.wunderground.com/cgi-bin/findweather/getForecast?query=";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("attire-decider/", env!("CARGO_PKG_VERSION"));

/// Live HTTP weather source.
pub struct WundergroundSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl WundergroundSource {
    /// Builds a source with its own HTTP client.
    ///
    /// # Parameters
    /// - `base_url`: page URL up to and including `query=`; the zip is appended
    /// - `timeout`: whole-request timeout
    /// - `user_agent`: sent with every request
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, AttireError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AttireError::SourceUnavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Full page URL for a zip code.
    pub fn page_url(&self, key: &LocationKey) -> String {
        build_page_url(&self.base_url, key)
    }
}

/// Appends the zip code to the configured base URL.
pub fn build_page_url(base_url: &str, key: &LocationKey) -> String {
    format!("{}{}", base_url, key)
}

impl WeatherSource for WundergroundSource {
    fn fetch(&self, key: &LocationKey) -> Result<RawPayload, AttireError> {
        let url = self.page_url(key);
        tracing::debug!(component = "source", zip = %key, %url, "fetching weather page");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html")
            .send()
            .map_err(|e| AttireError::SourceUnavailable(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttireError::SourceUnavailable(format!("HTTP error: {}", status)));
        }

        let body = response
            .text()
            .map_err(|e| AttireError::SourceUnavailable(format!("Failed to read body: {}", e)))?;

        // Stamp after the body arrives so the capture time reflects the data.
        let captured_at = Utc::now();
        tracing::debug!(component = "source", zip = %key, bytes = body.len(), "weather page received");

        Ok(RawPayload { body, captured_at })
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timeout: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("request failed: {}", err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_appends_zip() {
        let key = LocationKey::parse("08540").unwrap();
        assert_eq!(
            build_page_url(DEFAULT_BASE_URL, &key),
            "http://www.wunderground.com/cgi-bin/findweather/getForecast?query=08540"
        );
    }

    #[test]
    fn test_source_builds_with_defaults() {
        let source = WundergroundSource::new(
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_USER_AGENT,
        )
        .expect("client should build");
        let key = LocationKey::parse("98101").unwrap();
        assert!(source.page_url(&key).ends_with("query=98101"));
    }

    #[test]
    fn test_unreachable_host_is_source_unavailable() {
        // Port 9 on localhost (discard) is closed on test machines.
        let source = WundergroundSource::new(
            "http://127.0.0.1:9/weather?query=",
            Duration::from_secs(2),
            DEFAULT_USER_AGENT,
        )
        .unwrap();
        let err = source.fetch(&LocationKey::parse("08540").unwrap()).unwrap_err();
        assert!(matches!(err, AttireError::SourceUnavailable(_)), "got {:?}", err);
    }
}

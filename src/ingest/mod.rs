//! Weather page acquisition and field extraction.
//!
//! Submodules:
//! - `wunderground`: live HTTP source for the weather page.
//! - `replay`: serves previously saved pages from disk.
//! - `extract`: turns a page into a `WeatherSnapshot`.

pub mod extract;
pub mod replay;
pub mod wunderground;

use chrono::{DateTime, Utc};

use crate::locations::LocationKey;
use crate::model::AttireError;

/// Raw page body as returned by a source, stamped with the moment it was
/// captured.
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub body: String,
    pub captured_at: DateTime<Utc>,
}

/// Anything that can produce the current-conditions page for a zip code.
///
/// Implementations report every failure to produce a body as
/// `AttireError::SourceUnavailable`; judging the body's contents is left to
/// `extract`.
pub trait WeatherSource {
    fn fetch(&self, key: &LocationKey) -> Result<RawPayload, AttireError>;
}

impl<S: WeatherSource + ?Sized> WeatherSource for &S {
    fn fetch(&self, key: &LocationKey) -> Result<RawPayload, AttireError> {
        (**self).fetch(key)
    }
}

impl<S: WeatherSource + ?Sized> WeatherSource for Box<S> {
    fn fetch(&self, key: &LocationKey) -> Result<RawPayload, AttireError> {
        (**self).fetch(key)
    }
}

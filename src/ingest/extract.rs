//! Field extraction from the current-conditions page.
//!
//! The page is HTML, not structured data, so fields are found by fixed
//! markers. Each field is described by a `Rule`: a sequence of anchors
//! searched in order, then an end marker, applied to either the `<head>`
//! section or the whole document. A missing marker is always an error;
//! nothing is defaulted for required fields.
//!
//! # Title format
//! Town, state, temperature and sky are packed in the `og:title` meta tag:
//!
//! ```text
//! <meta property="og:title" content="Princeton, NJ (08540) | 72&deg;F | Clear" />
//! ```
//!
//! Field boundaries are positional:
//!   - before the 1st `|`: `<town>, <state> (<station zip>)`
//!   - between the 1st and 2nd `|`: `<temperature>°<unit>` (`&deg;` or `°`)
//!   - after the 2nd `|`: sky label, up to the closing quote
//!
//! Precipitation, humidity and feels-like live elsewhere in the page under
//! their own markers.

use crate::ingest::RawPayload;
use crate::locations::LocationKey;
use crate::model::{AttireError, WeatherSnapshot};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Which part of the page a rule is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Header,
    Document,
}

/// A single extraction contract: locate each anchor in turn, then read up
/// to the next `end` marker.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub scope: Scope,
    pub anchors: &'static [&'static str],
    pub end: &'static str,
}

impl Rule {
    /// Returns the text between the last anchor and the following `end`
    /// marker.
    pub fn locate<'a>(&self, text: &'a str) -> Result<&'a str, AttireError> {
        let mut pos = 0;
        for anchor in self.anchors {
            let found = text[pos..].find(anchor).ok_or_else(|| {
                AttireError::malformed(self.field, format!("marker `{}` not found", anchor))
            })?;
            pos += found + anchor.len();
        }

        let len = text[pos..].find(self.end).ok_or_else(|| {
            AttireError::malformed(self.field, format!("end marker `{}` not found", self.end))
        })?;

        Ok(&text[pos..pos + len])
    }
}

pub const HEADER_RULE: Rule = Rule {
    field: "header",
    scope: Scope::Document,
    anchors: &["<head>"],
    end: "</head>",
};

pub const TITLE_RULE: Rule = Rule {
    field: "title",
    scope: Scope::Header,
    anchors: &["<meta property=\"og:title\" content="],
    end: "/>",
};

pub const PRECIPITATION_RULE: Rule = Rule {
    field: "precipitation",
    scope: Scope::Document,
    anchors: &["precip_today", "wx-value\">"],
    end: "</span>",
};

pub const HUMIDITY_RULE: Rule = Rule {
    field: "humidity",
    scope: Scope::Document,
    anchors: &["\"humidity\":"],
    end: ",",
};

pub const FEELS_LIKE_RULE: Rule = Rule {
    field: "feels_like",
    scope: Scope::Document,
    anchors: &["\"feelslike\":"],
    end: ",",
};

/// Separator between the positional fields of the title.
pub const TITLE_DELIMITER: char = '|';

// ---------------------------------------------------------------------------
// Page scoping
// ---------------------------------------------------------------------------

struct Page<'a> {
    document: &'a str,
    header: &'a str,
}

impl<'a> Page<'a> {
    fn new(document: &'a str) -> Result<Self, AttireError> {
        let header = HEADER_RULE.locate(document)?;
        Ok(Page { document, header })
    }

    fn apply(&self, rule: &Rule) -> Result<&'a str, AttireError> {
        let text = match rule.scope {
            Scope::Header => self.header,
            Scope::Document => self.document,
        };
        rule.locate(text)
    }

    /// Optional fields: a missing marker yields `None`, and so does a value
    /// that is present but not a number.
    fn apply_optional(&self, rule: &Rule) -> Option<f64> {
        let raw = self.apply(rule).ok()?;
        match parse_number(rule.field, raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(component = "extract", field = rule.field, "ignoring {}", e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Title parsing
// ---------------------------------------------------------------------------

/// Fields carried by the composite `og:title` string.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleFields {
    pub town: String,
    pub state: String,
    pub station_zip: Option<String>,
    pub temperature_f: f64,
    pub sky: String,
}

/// Splits the composite title by delimiter position.
pub fn parse_title(raw: &str) -> Result<TitleFields, AttireError> {
    let title = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();

    let first = title.find(TITLE_DELIMITER).ok_or_else(|| {
        AttireError::malformed("title", "missing 1st `|` delimiter")
    })?;
    let second = title[first + 1..]
        .find(TITLE_DELIMITER)
        .map(|i| first + 1 + i)
        .ok_or_else(|| AttireError::malformed("title", "missing 2nd `|` delimiter"))?;

    let (town, state, station_zip) = parse_place(&title[..first])?;
    let temperature_f = parse_temperature(&title[first + 1..second])?;

    let sky = title[second + 1..].trim();
    if sky.is_empty() {
        return Err(AttireError::malformed("sky", "empty sky label"));
    }

    Ok(TitleFields {
        town,
        state,
        station_zip,
        temperature_f,
        sky: sky.to_string(),
    })
}

/// `Princeton, NJ (08540)` → ("Princeton", "NJ", Some("08540"))
fn parse_place(segment: &str) -> Result<(String, String, Option<String>), AttireError> {
    let (town, rest) = segment
        .split_once(',')
        .ok_or_else(|| AttireError::malformed("town", "missing `,` between town and state"))?;

    let town = town.trim();
    if town.is_empty() {
        return Err(AttireError::malformed("town", "empty town name"));
    }

    let (state, station_zip) = match rest.find('(') {
        Some(open) => {
            let close = rest[open..].find(')').ok_or_else(|| {
                AttireError::malformed("state", "unclosed `(` after state")
            })?;
            let zip = rest[open + 1..open + close].trim();
            let zip = (!zip.is_empty()).then(|| zip.to_string());
            (rest[..open].trim(), zip)
        }
        None => (rest.trim(), None),
    };

    if state.is_empty() {
        return Err(AttireError::malformed("state", "empty state name"));
    }

    Ok((town.to_string(), state.to_string(), station_zip))
}

/// `72&deg;F` or `72°F` → 72.0. Celsius readings are converted.
fn parse_temperature(segment: &str) -> Result<f64, AttireError> {
    let segment = segment.trim();
    let (number, unit) = if let Some(i) = segment.find("&deg;") {
        (&segment[..i], &segment[i + "&deg;".len()..])
    } else if let Some(i) = segment.find('°') {
        (&segment[..i], &segment[i + '°'.len_utf8()..])
    } else {
        return Err(AttireError::malformed(
            "temperature",
            format!("no degree marker in `{}`", segment),
        ));
    };

    let value = parse_number("temperature", number)?;
    match unit.trim() {
        "F" => Ok(value),
        "C" => Ok(value * 9.0 / 5.0 + 32.0),
        other => Err(AttireError::malformed(
            "temperature",
            format!("unknown unit `{}`", other),
        )),
    }
}

/// Parses an isolated value. Quotes, whitespace and a trailing `%` are
/// dropped first; non-finite results are rejected.
fn parse_number(field: &'static str, raw: &str) -> Result<f64, AttireError> {
    let cleaned = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches('%')
        .trim();

    let value: f64 = cleaned.parse().map_err(|_| {
        AttireError::malformed(field, format!("`{}` is not a number", cleaned))
    })?;

    if !value.is_finite() {
        return Err(AttireError::malformed(
            field,
            format!("`{}` is not a finite number", cleaned),
        ));
    }

    Ok(value)
}

// ---------------------------------------------------------------------------
// Snapshot extraction
// ---------------------------------------------------------------------------

/// Builds a complete snapshot from a page, or fails with `MalformedPayload`.
///
/// Fields are extracted in order: header, title (town, state, temperature,
/// sky), precipitation, then the optional humidity and feels-like values.
pub fn extract_snapshot(
    key: &LocationKey,
    payload: &RawPayload,
) -> Result<WeatherSnapshot, AttireError> {
    let page = Page::new(&payload.body)?;

    let title = parse_title(page.apply(&TITLE_RULE)?)?;

    let precipitation_in = parse_number(
        PRECIPITATION_RULE.field,
        page.apply(&PRECIPITATION_RULE)?,
    )?;
    if precipitation_in < 0.0 {
        return Err(AttireError::malformed(
            "precipitation",
            format!("negative amount {}", precipitation_in),
        ));
    }

    let humidity_pct = page.apply_optional(&HUMIDITY_RULE);
    let feels_like_f = page.apply_optional(&FEELS_LIKE_RULE);

    Ok(WeatherSnapshot {
        captured_at: payload.captured_at,
        location_key: key.clone(),
        town: title.town,
        state: title.state,
        temperature_f: title.temperature_f,
        sky: title.sky,
        precipitation_in,
        humidity_pct,
        feels_like_f,
        station_zip: title.station_zip,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

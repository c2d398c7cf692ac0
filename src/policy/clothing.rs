//! Clothing classification by temperature band.
//!
//! Five thresholds split the temperature line into six contiguous bands.
//! Thresholds are checked from hottest to coldest with `>=`, so a
//! temperature sitting exactly on a threshold belongs to the warmer band.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::AttireError;

/// Temperature thresholds in degrees Fahrenheit, in descending order:
///   hot > warm > cool > cold > freezing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothingThresholds {
    pub hot: f64,
    pub warm: f64,
    pub cool: f64,
    pub cold: f64,
    pub freezing: f64,
}

impl Default for ClothingThresholds {
    fn default() -> Self {
        Self {
            hot: 70.0,
            warm: 60.0,
            cool: 50.0,
            cold: 35.0,
            freezing: 15.0,
        }
    }
}

impl ClothingThresholds {
    /// Derives a full threshold set from what a user calls "cold" and "warm".
    ///
    /// `cool` sits halfway between the two; `hot` and `freezing` extend
    /// half that spacing beyond `warm` and `cold` respectively.
    pub fn from_preferences(cold: f64, warm: f64) -> Result<Self, AttireError> {
        if !cold.is_finite() || !warm.is_finite() {
            return Err(AttireError::Config(
                "cold and warm preferences must be numbers".to_string(),
            ));
        }
        if warm <= cold {
            return Err(AttireError::Config(format!(
                "warm preference ({}) must be above cold preference ({})",
                warm, cold
            )));
        }

        let cool = (warm + cold) / 2.0;
        let thresholds = Self {
            hot: warm + 0.5 * (warm - cool),
            warm,
            cool,
            cold,
            freezing: cold - 0.5 * (cool - cold),
        };
        thresholds.validate().map_err(AttireError::Config)?;
        Ok(thresholds)
    }

    /// Checks that every threshold is finite and that they strictly descend.
    pub fn validate(&self) -> Result<(), String> {
        let ordered = [
            ("hot", self.hot),
            ("warm", self.warm),
            ("cool", self.cool),
            ("cold", self.cold),
            ("freezing", self.freezing),
        ];

        for (name, value) in ordered {
            if !value.is_finite() {
                return Err(format!("thresholds.{} must be a finite number", name));
            }
        }

        for pair in ordered.windows(2) {
            let (upper_name, upper) = pair[0];
            let (lower_name, lower) = pair[1];
            if upper <= lower {
                return Err(format!(
                    "thresholds.{} ({}) must be above thresholds.{} ({})",
                    upper_name, upper, lower_name, lower
                ));
            }
        }

        Ok(())
    }
}

/// Clothing advice, one per temperature band, warmest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    TShirtShorts,
    ShortsPlusLayer,
    LightJacket,
    OuterLayer,
    WinterJacket,
    Freezing,
}

impl Advice {
    pub fn label(&self) -> &'static str {
        match self {
            Advice::TShirtShorts => "T-Shirt, Shorts",
            Advice::ShortsPlusLayer => "T-Shirt and Shorts + Layer",
            Advice::LightJacket => "Long Pants, Light Jacket",
            Advice::OuterLayer => "Long Pants, Outer Layer and/or Light Jacket",
            Advice::WinterJacket => "Long Pants, Winter Jacket, Hat",
            Advice::Freezing => "FREEZING: minimize outdoor exposure",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a temperature to exactly one advice band. First match wins.
///
/// A non-finite temperature never reaches here from extraction; if one
/// does, every comparison fails and it lands in `Freezing`.
pub fn classify(temp_f: f64, thresholds: &ClothingThresholds) -> Advice {
    if temp_f >= thresholds.hot {
        Advice::TShirtShorts
    } else if temp_f >= thresholds.warm {
        Advice::ShortsPlusLayer
    } else if temp_f >= thresholds.cool {
        Advice::LightJacket
    } else if temp_f >= thresholds.cold {
        Advice::OuterLayer
    } else if temp_f >= thresholds.freezing {
        Advice::WinterJacket
    } else {
        Advice::Freezing
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

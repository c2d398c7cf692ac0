//! Attire decider: fetches current conditions for a U.S. zip code, caches
//! them on disk, and turns the temperature into clothing advice.
//!
//! Flow: `ingest` (fetch + extract) → `cache` → `policy` (freshness,
//! clothing bands) → `pipeline` → `report`.

pub mod cache;
pub mod config;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod report;
pub mod verify;

pub use locations::LocationKey;
pub use model::{AttireError, AttireReport, DataOrigin, WeatherSnapshot};
pub use pipeline::AttirePipeline;

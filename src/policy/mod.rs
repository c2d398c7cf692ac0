//! Decision rules applied to weather snapshots.
//!
//! Submodules:
//! - `freshness`: whether a cached snapshot can be trusted for a request.
//! - `clothing`: temperature bands and the advice attached to each.

pub mod clothing;
pub mod freshness;

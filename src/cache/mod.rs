//! Snapshot storage, one record per location key.
//!
//! Submodules:
//! - `file`: one JSON record per zip code in a directory.
//! - `memory`: process-local map, for tests and embedding.

pub mod file;
pub mod memory;

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;

use crate::locations::LocationKey;
use crate::model::{AttireError, WeatherSnapshot};

/// Persists and retrieves the latest snapshot per location key.
///
/// `get` distinguishes three outcomes:
///   - `Ok(Some(_))` a decoded record, possibly old or for another place
///   - `Ok(None)` nothing stored under this key
///   - `Err(CacheReadCorruption)` a record exists but cannot be decoded
///
/// `put` replaces the whole record for a key. A reader never observes a
/// partially written snapshot.
pub trait CacheStore {
    fn get(&self, key: &LocationKey) -> Result<Option<WeatherSnapshot>, AttireError>;
    fn put(&self, key: &LocationKey, snapshot: &WeatherSnapshot) -> Result<(), AttireError>;
}

impl<C: CacheStore + ?Sized> CacheStore for &C {
    fn get(&self, key: &LocationKey) -> Result<Option<WeatherSnapshot>, AttireError> {
        (**self).get(key)
    }

    fn put(&self, key: &LocationKey, snapshot: &WeatherSnapshot) -> Result<(), AttireError> {
        (**self).put(key, snapshot)
    }
}

impl<C: CacheStore + ?Sized> CacheStore for Box<C> {
    fn get(&self, key: &LocationKey) -> Result<Option<WeatherSnapshot>, AttireError> {
        (**self).get(key)
    }

    fn put(&self, key: &LocationKey, snapshot: &WeatherSnapshot) -> Result<(), AttireError> {
        (**self).put(key, snapshot)
    }
}

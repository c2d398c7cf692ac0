//! In-memory snapshot store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::cache::CacheStore;
use crate::locations::LocationKey;
use crate::model::{AttireError, WeatherSnapshot};

/// Map-backed store. Snapshots are swapped whole under the lock.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<LocationKey, WeatherSnapshot>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &LocationKey) -> Result<Option<WeatherSnapshot>, AttireError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &LocationKey, snapshot: &WeatherSnapshot) -> Result<(), AttireError> {
        self.entries.lock().insert(key.clone(), snapshot.clone());
        Ok(())
    }
}

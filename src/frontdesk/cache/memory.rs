use super::CacheStore;
use crate::error::Result;
use std::collections::HashMap;

/// In-memory cache for testing.
/// Does NOT persist data.
#[derive(Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::cache;
    use crate::state::Snapshot;

    /// A cache pre-seeded with a persisted snapshot, for hydration tests.
    pub fn seeded_with(snapshot: &Snapshot) -> MemoryCache {
        let mut cache = MemoryCache::new();
        cache::persist(&mut cache, snapshot).unwrap();
        cache
    }
}

//! Durable cache: key-value persistence of the application snapshot.
//!
//! Five independently-keyed JSON values — `keys`, `rows`, `syncQueue`,
//! `signedIn`, `search` — are written after every snapshot change and read
//! once at boot. A missing key means "no cached value", never an error, so a
//! first run hydrates into defaults. The cache is write-only after boot;
//! nothing ever reads it back into the live process.
//!
//! The [`CacheStore`] trait keeps the engine testable without a filesystem:
//! [`fs::FileCache`] is the production backend, [`memory::MemoryCache`] the
//! test one.

use crate::error::Result;
use crate::state::{CachedState, Snapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod fs;
pub mod memory;

pub const KEY_KEYS: &str = "keys";
pub const KEY_ROWS: &str = "rows";
pub const KEY_QUEUE: &str = "syncQueue";
pub const KEY_SIGNED_IN: &str = "signedIn";
pub const KEY_SEARCH: &str = "search";

/// Abstract interface for durable string storage.
pub trait CacheStore {
    /// Read one key; absent keys yield `None`.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write one key, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Read all five cache keys into a hydration payload. A corrupt value is an
/// error (the loader reports failure, which the gate treats as "no cache").
pub fn load(cache: &impl CacheStore) -> Result<CachedState> {
    Ok(CachedState {
        keys: read_json(cache, KEY_KEYS)?,
        rows: read_json(cache, KEY_ROWS)?,
        sync_queue: read_json(cache, KEY_QUEUE)?,
        signed_in: read_json(cache, KEY_SIGNED_IN)?,
        search: read_json(cache, KEY_SEARCH)?,
    })
}

/// Write the snapshot's five cached fields.
pub fn persist(cache: &mut impl CacheStore, snapshot: &Snapshot) -> Result<()> {
    write_json(cache, KEY_KEYS, &snapshot.keys)?;
    write_json(cache, KEY_ROWS, &snapshot.rows)?;
    write_json(cache, KEY_QUEUE, &snapshot.sync_queue)?;
    write_json(cache, KEY_SIGNED_IN, &snapshot.session.as_bool())?;
    write_json(cache, KEY_SEARCH, &snapshot.search)?;
    Ok(())
}

// A stored JSON null (an unknown session, say) reads back as "no cached
// value", the same as a missing key.
fn read_json<T: DeserializeOwned>(cache: &impl CacheStore, key: &str) -> Result<Option<T>> {
    match cache.read(key)? {
        None => Ok(None),
        Some(text) => Ok(serde_json::from_str::<Option<T>>(&text)?),
    }
}

fn write_json<T: Serialize>(cache: &mut impl CacheStore, key: &str, value: &T) -> Result<()> {
    cache.write(key, &serde_json::to_string(value)?)
}

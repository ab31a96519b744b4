use super::CacheStore;
use crate::error::{FrontdeskError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed cache: one JSON file per key under the data directory.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(FrontdeskError::Io)?;
        }
        Ok(())
    }
}

impl CacheStore for FileCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(FrontdeskError::Io)?;
        Ok(Some(content))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.key_path(key), value).map_err(FrontdeskError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{self, KEY_QUEUE};
    use crate::state::Snapshot;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("cache"));
        assert_eq!(cache.read("rows").unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("cache"));
        cache.write("signedIn", "true").unwrap();
        assert_eq!(cache.read("signedIn").unwrap().as_deref(), Some("true"));

        cache.write("signedIn", "false").unwrap();
        assert_eq!(cache.read("signedIn").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn persist_creates_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileCache::new(dir.path().join("cache"));
        cache::persist(&mut store, &Snapshot::default()).unwrap();
        assert!(dir.path().join("cache").join("rows.json").exists());
        assert!(dir.path().join("cache").join(format!("{}.json", KEY_QUEUE)).exists());
    }
}

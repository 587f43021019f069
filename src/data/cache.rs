use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime};

use super::loader::LoadError;
use super::model::RecordSet;

// ---------------------------------------------------------------------------
// Cache key: which file, at which modification time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn for_path(path: &Path) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        CacheKey { path, modified }
    }
}

struct CacheEntry {
    key: CacheKey,
    loaded_at: Instant,
    dataset: Arc<RecordSet>,
}

// ---------------------------------------------------------------------------
// DatasetCache – one memoized dataset
// ---------------------------------------------------------------------------

/// Holds the last successfully loaded dataset.
///
/// An entry is reused while the file path and modification time match and it
/// is younger than the TTL. A zero TTL means no time limit. Replacement swaps
/// the whole `Arc`, so readers keep whichever complete dataset they fetched.
pub struct DatasetCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        DatasetCache {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached dataset for `path`, or run `load` and cache its result.
    /// Failures are returned and not cached.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<RecordSet>, LoadError>
    where
        F: FnOnce(&Path) -> Result<RecordSet, LoadError>,
    {
        let key = CacheKey::for_path(path);

        if let Some(dataset) = self.lookup(&key) {
            log::debug!("Cache hit for {}", key.path.display());
            return Ok(dataset);
        }

        log::debug!("Cache miss for {}, loading", key.path.display());
        let dataset = Arc::new(load(path)?);

        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CacheEntry {
            key,
            loaded_at: Instant::now(),
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the cached dataset so the next lookup reloads.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<RecordSet>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        let entry = slot.as_ref()?;
        if entry.key != *key {
            return None;
        }
        if !self.ttl.is_zero() && entry.loaded_at.elapsed() >= self.ttl {
            return None;
        }
        Some(Arc::clone(&entry.dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    use crate::config::DashboardConfig;
    use crate::data::loader::load_dataset;

    fn counting_loader<'a>(
        calls: &'a Cell<usize>,
    ) -> impl Fn(&Path) -> Result<RecordSet, LoadError> + 'a {
        move |_path: &Path| {
            calls.set(calls.get() + 1);
            Ok(RecordSet::new(Vec::new(), BTreeSet::new(), calls.get()))
        }
    }

    #[test]
    fn second_lookup_hits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masts.csv");
        std::fs::write(&path, "MNC,Latitude,Longitude\n30,6.5,3.3\n").unwrap();

        let cache = DatasetCache::new(Duration::from_secs(600));
        let calls = Cell::new(0);
        let a = cache.get_or_load(&path, counting_loader(&calls)).unwrap();
        let b = cache.get_or_load(&path, counting_loader(&calls)).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn expired_entry_reloads_and_old_readers_keep_their_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masts.csv");
        std::fs::write(&path, "MNC\n").unwrap();

        let cache = DatasetCache::new(Duration::from_millis(1));
        let calls = Cell::new(0);
        let old = cache.get_or_load(&path, counting_loader(&calls)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let new = cache.get_or_load(&path, counting_loader(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(old.dropped_rows, 1);
        assert_eq!(new.dropped_rows, 2);
    }

    #[test]
    fn different_path_or_invalidate_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(&first, "MNC\n").unwrap();
        std::fs::write(&second, "MNC\n").unwrap();

        let cache = DatasetCache::new(Duration::ZERO);
        let calls = Cell::new(0);
        cache.get_or_load(&first, counting_loader(&calls)).unwrap();
        cache.get_or_load(&second, counting_loader(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
        cache.invalidate();
        cache.get_or_load(&second, counting_loader(&calls)).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn modified_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masts.csv");
        std::fs::write(&path, "MNC,Latitude,Longitude\n30,6.5,3.3\n").unwrap();

        let config = DashboardConfig::default();
        let cache = DatasetCache::new(Duration::ZERO);
        let before = cache.get_or_load(&path, |p| load_dataset(p, &config)).unwrap();
        let again = cache.get_or_load(&path, |p| load_dataset(p, &config)).unwrap();
        assert!(Arc::ptr_eq(&before, &again));

        std::fs::write(&path, "MNC,Latitude,Longitude\n30,6.5,3.3\n50,7.0,8.0\n").unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(10))
            .unwrap();
        drop(file);

        let after = cache.get_or_load(&path, |p| load_dataset(p, &config)).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let config = DashboardConfig::default();
        let cache = DatasetCache::new(Duration::ZERO);

        assert!(cache.get_or_load(&path, |p| load_dataset(p, &config)).is_err());
        std::fs::write(&path, "MNC,Latitude,Longitude\n30,6.5,3.3\n").unwrap();
        let dataset = cache.get_or_load(&path, |p| load_dataset(p, &config)).unwrap();
        assert_eq!(dataset.len(), 1);
    }
}

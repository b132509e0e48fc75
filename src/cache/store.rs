//! Process-wide content cache keyed by file path.

use bytes::Bytes;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cached file content with its resolved content type.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Thread-safe path-keyed cache shared by every registration.
///
/// Entries are inserted by full-mode preloads, adaptive promotions, and
/// rebalance loads; they are removed by rebalance evictions and `clear`.
#[derive(Clone, Default)]
pub struct CacheStore {
    entries: Arc<DashMap<PathBuf, Arc<CacheEntry>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<CacheEntry>> {
        self.entries.get(path).map(|e| e.value().clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&self, path: PathBuf, entry: CacheEntry) {
        self.entries.insert(path, Arc::new(entry));
    }

    pub fn remove(&self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths currently cached, for inspection and tests.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

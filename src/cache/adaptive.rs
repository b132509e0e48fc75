//! Adaptation groups: per-registration frequency tracking and byte budget.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::fsdir::media::MediaTypes;

/// Request statistics for one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// Requests observed since the group was created.
    pub hits: u64,
    /// Content size recorded when the file was first served.
    pub bytes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct GroupState {
    /// Byte total of this group's files currently resident in the store.
    pub used: u64,
    pub files: HashMap<PathBuf, FileStats>,
}

/// One adaptive-caching scope, created per adaptive directory registration
/// and alive for the rest of the process. Groups never share budget.
pub struct AdaptationGroup {
    id: u64,
    capacity: u64,
    media: Arc<MediaTypes>,
    pub(crate) state: Mutex<GroupState>,
}

impl AdaptationGroup {
    pub(crate) fn new(id: u64, capacity: u64, media: Arc<MediaTypes>) -> Self {
        Self {
            id,
            capacity,
            media,
            state: Mutex::new(GroupState::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Maximum bytes this group may hold in the store.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub(crate) fn media(&self) -> &Arc<MediaTypes> {
        &self.media
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().expect("adaptation group mutex poisoned")
    }

    /// Bytes the group currently accounts for in the store.
    pub fn cached_bytes(&self) -> u64 {
        self.lock().used
    }

    /// Number of files with recorded statistics.
    pub fn tracked_files(&self) -> usize {
        self.lock().files.len()
    }

    /// Statistics for one file, if tracked.
    pub fn stats(&self, path: &std::path::Path) -> Option<FileStats> {
        self.lock().files.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_starts_empty() {
        let group = AdaptationGroup::new(1, 1024, Arc::new(MediaTypes::default()));
        assert_eq!(group.id(), 1);
        assert_eq!(group.capacity(), 1024);
        assert_eq!(group.cached_bytes(), 0);
        assert_eq!(group.tracked_files(), 0);
    }
}

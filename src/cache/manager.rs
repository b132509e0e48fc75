//! Cache manager: promotion, eviction, and the rebalance pass.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::cache::adaptive::{AdaptationGroup, FileStats};
use crate::cache::balancer::{plan_group, BalanceClock, BalanceReport};
use crate::cache::store::{CacheEntry, CacheStore};
use crate::fsdir::media;
use crate::observability::metrics;

/// Owns the process-wide store, every adaptation group, and the balance
/// trigger. All cache state is reached through its operations.
pub struct CacheManager {
    store: CacheStore,
    groups: Mutex<Vec<Arc<AdaptationGroup>>>,
    clock: BalanceClock,
    next_group_id: AtomicU64,
    /// Serializes rebalance passes; the claim in `BalanceClock` already
    /// prevents overlapping periodic passes, this also covers forced runs.
    balance_gate: tokio::sync::Mutex<()>,
}

impl CacheManager {
    pub fn new(balance_interval: Duration) -> Self {
        Self {
            store: CacheStore::new(),
            groups: Mutex::new(Vec::new()),
            clock: BalanceClock::new(balance_interval),
            next_group_id: AtomicU64::new(1),
            balance_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Create a new adaptation group with its own byte budget.
    pub fn create_group(
        &self,
        capacity: u64,
        media_types: Arc<media::MediaTypes>,
    ) -> Arc<AdaptationGroup> {
        let id = self.next_group_id.fetch_add(1, Ordering::Relaxed);
        let group = Arc::new(AdaptationGroup::new(id, capacity, media_types));
        self.groups
            .lock()
            .expect("cache manager groups mutex poisoned")
            .push(group.clone());
        tracing::debug!(group = id, capacity, "Adaptation group created");
        group
    }

    /// Record one request for `path` in `group` and opportunistically promote
    /// it into the store.
    ///
    /// Promotion is first-fit: the file enters the store only if the group's
    /// accounted bytes plus its size stay within capacity at this instant.
    /// Files requested early can therefore occupy the budget ahead of files
    /// that later prove more popular; the gap persists until the next
    /// rebalance recomputes residency from the counters. `entry` is only
    /// materialized when the promotion goes through.
    pub fn record_hit(
        &self,
        group: &AdaptationGroup,
        path: &Path,
        bytes: u64,
        entry: impl FnOnce() -> CacheEntry,
    ) {
        let mut state = group.lock();
        let stats = state
            .files
            .entry(path.to_path_buf())
            .or_insert(FileStats { hits: 0, bytes });
        stats.hits += 1;

        if !self.store.contains(path) && state.used + bytes <= group.capacity() {
            state.used += bytes;
            self.store.insert(path.to_path_buf(), entry());
            metrics::record_promotion();
            tracing::trace!(path = %path.display(), group = group.id(), bytes, "Promoted into cache");
        }
    }

    /// Drop every cached entry and zero each group's accounting. Request
    /// counters are kept; a later rebalance repopulates from them.
    pub fn clear(&self) {
        self.store.clear();
        let groups = self
            .groups
            .lock()
            .expect("cache manager groups mutex poisoned")
            .clone();
        for group in groups {
            group.lock().used = 0;
        }
        metrics::record_cache_entries(0);
        tracing::debug!("Cache cleared");
    }

    /// Run a rebalance pass now if the interval has elapsed and nobody else
    /// claimed it. Runs on a spawned task; dispatch never waits on it.
    pub fn maybe_spawn_rebalance(self: Arc<Self>) {
        if !self.clock.try_claim() {
            return;
        }
        let manager = self;
        tokio::spawn(async move {
            let report = manager.rebalance().await;
            tracing::debug!(
                groups = report.groups,
                kept = report.kept,
                evicted = report.evicted,
                loaded = report.loaded,
                dropped = report.dropped,
                "Periodic cache rebalance finished"
            );
        });
    }

    /// Recompute cache residency for every group: rank the group's files by
    /// request count, grant residency greedily within the byte budget, evict
    /// everything else from the store, and read in granted files that are
    /// not yet resident. Groups are balanced independently and never borrow
    /// capacity from one another.
    ///
    /// With no traffic between two passes the second pass grants the same
    /// set and changes nothing.
    pub async fn rebalance(&self) -> BalanceReport {
        let _gate = self.balance_gate.lock().await;
        let started = Instant::now();

        let groups = self
            .groups
            .lock()
            .expect("cache manager groups mutex poisoned")
            .clone();

        let mut report = BalanceReport {
            groups: groups.len(),
            ..BalanceReport::default()
        };

        for group in groups {
            let plan = {
                let mut state = group.lock();
                let files = state
                    .files
                    .iter()
                    .map(|(path, stats)| (path.clone(), *stats))
                    .collect();
                let plan = plan_group(files, group.capacity());
                state.used = plan.kept_bytes;
                plan
            };

            for path in &plan.evict {
                self.store.remove(path);
            }
            report.evicted += plan.evict.len();
            metrics::record_eviction(plan.evict.len() as u64);

            for (path, _bytes) in &plan.keep {
                report.kept += 1;
                if self.store.contains(path) {
                    continue;
                }
                match self.load_for_group(&group, path).await {
                    Ok(entry) => {
                        self.store.insert(path.clone(), entry);
                        report.loaded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            group = group.id(),
                            error = %e,
                            "Rebalance could not re-read file; dropping it from the group"
                        );
                        self.drop_tracked(&group, path);
                        report.kept -= 1;
                        report.dropped += 1;
                    }
                }
            }
        }

        metrics::record_cache_entries(self.store.len());
        metrics::record_rebalance(started.elapsed());
        report
    }

    async fn load_for_group(
        &self,
        group: &AdaptationGroup,
        path: &PathBuf,
    ) -> std::io::Result<CacheEntry> {
        let ext = media::path_extension(path).unwrap_or_default();
        let encoding = group.media().encoding_for(&ext);
        let content_type = group.media().mime_for(&ext).map(str::to_string);
        let body = media::read_file(path, encoding).await?;
        Ok(CacheEntry { body, content_type })
    }

    fn drop_tracked(&self, group: &AdaptationGroup, path: &Path) {
        let mut state = group.lock();
        if let Some(stats) = state.files.remove(path) {
            state.used = state.used.saturating_sub(stats.bytes);
        }
    }
}

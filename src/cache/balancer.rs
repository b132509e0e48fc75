//! Rebalance planning and trigger timing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::cache::adaptive::FileStats;

/// Single-flight trigger for the periodic rebalance.
///
/// `try_claim` succeeds for exactly one caller per elapsed interval: the
/// next-due timestamp advances with a compare-and-swap, so two dispatchers
/// observing "interval elapsed" at once cannot both start a pass.
/// A zero interval disables the trigger entirely.
pub struct BalanceClock {
    interval_ms: u64,
    origin: Instant,
    next_due_ms: AtomicU64,
}

impl BalanceClock {
    pub fn new(interval: Duration) -> Self {
        let interval_ms = interval.as_millis() as u64;
        Self {
            interval_ms,
            origin: Instant::now(),
            next_due_ms: AtomicU64::new(interval_ms),
        }
    }

    pub fn enabled(&self) -> bool {
        self.interval_ms != 0
    }

    /// Claim the current interval. At most one caller wins per interval.
    pub fn try_claim(&self) -> bool {
        if self.interval_ms == 0 {
            return false;
        }
        let now = self.origin.elapsed().as_millis() as u64;
        let due = self.next_due_ms.load(Ordering::Acquire);
        if now < due {
            return false;
        }
        self.next_due_ms
            .compare_exchange(due, now + self.interval_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Outcome of a rebalance pass, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BalanceReport {
    /// Groups inspected.
    pub groups: usize,
    /// Files granted residency across all groups.
    pub kept: usize,
    /// Files evicted from the store.
    pub evicted: usize,
    /// Kept files that had to be read from disk.
    pub loaded: usize,
    /// Tracked files dropped because their content vanished.
    pub dropped: usize,
}

/// Residency plan for one group.
#[derive(Debug)]
pub(crate) struct GroupPlan {
    /// Files granted residency, with their recorded sizes.
    pub keep: Vec<(PathBuf, u64)>,
    /// Files denied residency.
    pub evict: Vec<PathBuf>,
    /// Byte total of the kept files.
    pub kept_bytes: u64,
}

/// Greedy bin-fill over a group's tracked files: sort by descending request
/// count, accept while the running byte total stays within capacity. Not a
/// knapsack: an oversized popular file that does not fit is skipped while
/// smaller, less popular files after it may still be accepted. Ties in the
/// request count are broken arbitrarily.
pub(crate) fn plan_group(mut files: Vec<(PathBuf, FileStats)>, capacity: u64) -> GroupPlan {
    files.sort_unstable_by(|a, b| b.1.hits.cmp(&a.1.hits));

    let mut keep = Vec::new();
    let mut evict = Vec::new();
    let mut kept_bytes: u64 = 0;
    for (path, stats) in files {
        if kept_bytes + stats.bytes <= capacity {
            kept_bytes += stats.bytes;
            keep.push((path, stats.bytes));
        } else {
            evict.push(path);
        }
    }
    GroupPlan {
        keep,
        evict,
        kept_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, hits: u64, bytes: u64) -> (PathBuf, FileStats) {
        (PathBuf::from(name), FileStats { hits, bytes })
    }

    #[test]
    fn test_plan_prefers_frequent_files() {
        let plan = plan_group(
            vec![file("c", 1, 100), file("a", 10, 100), file("b", 5, 100)],
            200,
        );
        let kept: Vec<_> = plan.keep.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(kept, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(plan.evict, vec![PathBuf::from("c")]);
        assert_eq!(plan.kept_bytes, 200);
    }

    #[test]
    fn test_plan_skips_oversized_then_fills() {
        // The popular file does not fit; smaller files behind it still do.
        let plan = plan_group(
            vec![file("huge", 50, 500), file("s1", 3, 100), file("s2", 2, 100)],
            200,
        );
        let kept: Vec<_> = plan.keep.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(kept, vec![PathBuf::from("s1"), PathBuf::from("s2")]);
        assert_eq!(plan.evict, vec![PathBuf::from("huge")]);
    }

    #[test]
    fn test_plan_respects_capacity_exactly() {
        let plan = plan_group(vec![file("a", 2, 150), file("b", 1, 50)], 200);
        assert_eq!(plan.kept_bytes, 200);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_clock_zero_interval_disabled() {
        let clock = BalanceClock::new(Duration::ZERO);
        assert!(!clock.enabled());
        assert!(!clock.try_claim());
    }

    #[test]
    fn test_clock_claims_once_per_interval() {
        let clock = BalanceClock::new(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.try_claim());
        // Immediately after a claim the interval has not elapsed again.
        assert!(!clock.try_claim());
    }

    #[test]
    fn test_clock_not_due_before_first_interval() {
        let clock = BalanceClock::new(Duration::from_secs(3600));
        assert!(clock.enabled());
        assert!(!clock.try_claim());
    }
}

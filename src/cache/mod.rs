//! Adaptive caching subsystem.
//!
//! # Data Flow
//! ```text
//! Request served by an adaptive static handler
//!     → manager.rs record_hit (bump counter, first-fit promotion)
//!     → store.rs (process-wide path-keyed entries)
//!
//! After dispatch, once per interval (CAS-claimed):
//!     manager.rs rebalance
//!     → balancer.rs plan_group (rank by hits, greedy bin-fill per group)
//!     → evict losers, read in winners
//! ```
//!
//! # Design Decisions
//! - One store for the whole process; budgets and counters live per group
//! - Eviction happens only in rebalance passes, not on access
//! - A promotion racing an eviction of the same file is benign: last writer
//!   wins, the worst case is one redundant disk read

pub mod adaptive;
pub mod balancer;
pub mod manager;
pub mod store;

pub use adaptive::{AdaptationGroup, FileStats};
pub use balancer::{BalanceClock, BalanceReport};
pub use manager::CacheManager;
pub use store::{CacheEntry, CacheStore};

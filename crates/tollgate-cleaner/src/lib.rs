//! # tollgate-cleaner
//!
//! Background removal of expired tickets:
//! - A lease-based [`ClusterLock`] so only one node sweeps at a time
//! - The [`TicketCleaner`] pass that deletes expired sessions through the
//!   logout-decorated registry and expired grants directly
//! - The [`CleanerRunner`] schedule with a start delay and a fixed repeat
//!   interval
//!
//! Every node runs the schedule; the lock decides which node actually
//! executes a given pass. A node that loses the lock skips the pass
//! instead of waiting.

pub mod cleaner;
pub mod lock;
pub mod runner;

pub use cleaner::{CleanupOutcome, TicketCleaner};
#[cfg(feature = "redis-lock")]
pub use lock::RedisClusterLock;
pub use lock::{ClusterLock, MemoryClusterLock, build_cluster_lock};
pub use runner::CleanerRunner;

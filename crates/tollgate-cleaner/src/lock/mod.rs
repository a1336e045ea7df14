//! Cluster-wide mutual exclusion with expiring leases.

pub mod memory;
#[cfg(feature = "redis-lock")]
pub mod redis;
pub mod strategy;

pub use memory::MemoryClusterLock;
#[cfg(feature = "redis-lock")]
pub use redis::RedisClusterLock;
pub use strategy::{build_cluster_lock, ClusterLock};

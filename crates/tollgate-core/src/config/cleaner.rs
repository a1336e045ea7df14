//! Expired-ticket cleanup configuration.

use serde::{Deserialize, Serialize};

/// Cleanup scheduling configuration.
///
/// One cleanup runner is scheduled per node; the cluster lock ensures only
/// one node actually executes a pass at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Whether the cleanup runner is started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds to wait after startup before the first pass.
    #[serde(default = "default_start_delay")]
    pub start_delay_seconds: u64,
    /// Seconds between the start of consecutive passes.
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval_seconds: u64,
    /// Cluster lock configuration.
    #[serde(default)]
    pub lock: LockConfig,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_delay_seconds: default_start_delay(),
            repeat_interval_seconds: default_repeat_interval(),
            lock: LockConfig::default(),
        }
    }
}

/// Cluster lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Lock provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_lock_provider")]
    pub provider: String,
    /// Lease duration in seconds. A crashed holder's lease expires on its
    /// own so the rest of the cluster is never blocked permanently.
    #[serde(default = "default_lease")]
    pub lease_seconds: u64,
    /// Redis key under which the lock is held.
    #[serde(default = "default_lock_key")]
    pub key: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            provider: default_lock_provider(),
            lease_seconds: default_lease(),
            key: default_lock_key(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_start_delay() -> u64 {
    20
}

fn default_repeat_interval() -> u64 {
    120
}

fn default_lock_provider() -> String {
    "memory".to_string()
}

fn default_lease() -> u64 {
    300
}

fn default_lock_key() -> String {
    "tollgate:locks:cleaner".to_string()
}

//! The cluster lock contract and provider selection.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use tollgate_core::config::cleaner::LockConfig;
use tollgate_core::config::registry::RedisRegistryConfig;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;

/// Lease-based mutual exclusion across cooperating nodes.
///
/// Acquisition is non-reentrant: while a lease is live, every caller is
/// refused, the current holder included. A lease expires on its own, so a
/// crashed holder never blocks the cluster permanently.
#[async_trait]
pub trait ClusterLock: Send + Sync + fmt::Debug + 'static {
    /// Try to take the lock for `lease`. Returns whether it was taken.
    async fn acquire(&self, lease: Duration) -> AppResult<bool>;

    /// Give the lock up. Releasing a lock held by another node, or not
    /// held at all, is a logged no-op.
    async fn release(&self) -> AppResult<()>;
}

/// Build the configured lock implementation.
///
/// The Redis provider shares the registry's connection settings; only the
/// lock key and lease come from the lock section.
pub async fn build_cluster_lock(
    config: &LockConfig,
    redis: &RedisRegistryConfig,
) -> AppResult<Arc<dyn ClusterLock>> {
    match config.provider.as_str() {
        #[cfg(feature = "redis-lock")]
        "redis" => {
            let client = tollgate_registry::redis::RedisClient::connect(redis).await?;
            info!(key = %config.key, "Using Redis cluster lock");
            Ok(Arc::new(crate::lock::redis::RedisClusterLock::new(
                client,
                config.key.clone(),
            )))
        }
        "memory" => {
            info!("Using in-memory cluster lock");
            Ok(Arc::new(crate::lock::memory::MemoryClusterLock::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown lock provider: '{other}'. Supported providers: memory, redis"
        ))),
    }
}

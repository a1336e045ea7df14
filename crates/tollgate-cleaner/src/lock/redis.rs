//! Redis-backed cluster lock.
//!
//! The lease is the lock key's TTL: `SET key holder EX lease NX` takes the
//! lock, and a crashed holder's lease simply times out, so takeover needs
//! no special casing. Release is compare-and-delete through a Lua script
//! so one node can never drop another node's lease.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_registry::redis::RedisClient;

use crate::lock::strategy::ClusterLock;

/// Compare-and-delete release.
///
/// KEYS[1] = lock key
/// ARGV[1] = holder id
///
/// Returns 1 when the caller held the lock and it was removed, else 0.
const RELEASE_SCRIPT: &str = r#"
    if redis.call('GET', KEYS[1]) == ARGV[1] then
        return redis.call('DEL', KEYS[1])
    end
    return 0
"#;

/// Cluster lock for multi-node deployments, sharing the registry's
/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisClusterLock {
    client: RedisClient,
    key: String,
    holder_id: String,
}

impl RedisClusterLock {
    /// `key` is used verbatim, without the registry's key prefix.
    pub fn new(client: RedisClient, key: String) -> Self {
        Self {
            client,
            key,
            holder_id: format!("node-{}", Uuid::new_v4()),
        }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::LockUnavailable, format!("Redis lock error: {e}"), e)
    }
}

#[async_trait]
impl ClusterLock for RedisClusterLock {
    async fn acquire(&self, lease: Duration) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();

        let result: Option<String> = redis::cmd("SET")
            .arg(&self.key)
            .arg(&self.holder_id)
            .arg("EX")
            .arg(lease.as_secs().max(1))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let acquired = result.is_some();
        debug!(key = %self.key, acquired, "Cluster lock acquisition attempted");
        Ok(acquired)
    }

    async fn release(&self) -> AppResult<()> {
        let mut conn = self.client.conn_mut();

        let released: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(&self.key)
            .arg(&self.holder_id)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if released == 0 {
            warn!(key = %self.key, "Release skipped, this node does not hold the lock");
        }
        Ok(())
    }
}

//! In-memory cluster lock for single-node deployments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use tollgate_core::result::AppResult;

use super::strategy::ClusterLock;

/// The live lease, if any.
#[derive(Debug, Clone)]
struct Lease {
    holder_id: String,
    expires_at: Instant,
}

/// Process-local lock with the same lease semantics as the Redis one.
///
/// [`MemoryClusterLock::sibling`] hands out a second handle on the same
/// lease state under a fresh node identity, which is how multi-node
/// contention is exercised without Redis.
#[derive(Debug)]
pub struct MemoryClusterLock {
    holder_id: String,
    state: Arc<Mutex<Option<Lease>>>,
}

impl MemoryClusterLock {
    pub fn new() -> Self {
        Self {
            holder_id: format!("node-{}", Uuid::new_v4()),
            state: Arc::new(Mutex::new(None)),
        }
    }

    /// Another node's handle on the same lock.
    pub fn sibling(&self) -> Self {
        Self {
            holder_id: format!("node-{}", Uuid::new_v4()),
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MemoryClusterLock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterLock for MemoryClusterLock {
    async fn acquire(&self, lease: Duration) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if let Some(current) = state.as_ref() {
            if current.expires_at > now {
                debug!(holder = %current.holder_id, "Lock is held, acquisition refused");
                return Ok(false);
            }
            debug!(previous = %current.holder_id, "Taking over an expired lock lease");
        }

        *state = Some(Lease {
            holder_id: self.holder_id.clone(),
            expires_at: now + lease,
        });
        Ok(true)
    }

    async fn release(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.as_ref() {
            Some(lease) if lease.holder_id == self.holder_id => {
                *state = None;
            }
            Some(lease) => {
                warn!(holder = %lease.holder_id, "Refusing to release a lock held by another node");
            }
            None => {
                debug!("Release requested on a lock nobody holds");
            }
        }
        Ok(())
    }
}

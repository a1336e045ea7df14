//! The expired-ticket cleanup pass.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use tollgate_core::config::cleaner::CleanerConfig;
use tollgate_core::result::AppResult;
use tollgate_registry::TicketRegistry;
use tollgate_ticket::Ticket;

use crate::lock::ClusterLock;

/// Summary of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// Whether this node ran the pass. `false` means the lock was held
    /// elsewhere and the pass was skipped.
    pub executed: bool,
    /// Expired tickets found by the scan.
    pub expired: usize,
    /// Tickets actually removed, session cascades included.
    pub removed: u64,
    /// Tickets whose removal failed.
    pub failures: usize,
}

/// Finds and removes expired tickets under the cluster lock.
///
/// The registry handle is expected to be the logout-decorated stack:
/// deleting an expired session then notifies its services before the
/// session and its grants disappear.
#[derive(Debug)]
pub struct TicketCleaner {
    registry: Arc<dyn TicketRegistry>,
    lock: Arc<dyn ClusterLock>,
    lease: Duration,
}

impl TicketCleaner {
    pub fn new(
        registry: Arc<dyn TicketRegistry>,
        lock: Arc<dyn ClusterLock>,
        config: &CleanerConfig,
    ) -> Self {
        Self {
            registry,
            lock,
            lease: Duration::from_secs(config.lock.lease_seconds),
        }
    }

    /// Run one cleanup pass.
    ///
    /// Skips entirely when another node holds the lock. A failed removal
    /// is logged and the pass continues with the next ticket; the lock is
    /// released whatever the pass does.
    pub async fn clean(&self) -> AppResult<CleanupOutcome> {
        if !self.lock.acquire(self.lease).await? {
            debug!("Cleanup lock is held elsewhere, skipping this pass");
            return Ok(CleanupOutcome::default());
        }

        let outcome = self.clean_locked().await;
        if let Err(e) = self.lock.release().await {
            warn!(error = %e, "Failed to release the cleanup lock, the lease will expire on its own");
        }
        outcome
    }

    async fn clean_locked(&self) -> AppResult<CleanupOutcome> {
        let tickets = self.registry.get_tickets().await?;
        let now = Utc::now();

        // Expired sessions first, so their cascades sweep dependent grants
        // before those grants are visited individually.
        let mut sessions = Vec::new();
        let mut grants = Vec::new();
        for ticket in tickets {
            if let Ticket::Encoded(encoded) = &ticket {
                warn!(storage_id = %encoded.id, "Skipping an encoded carrier, expiry cannot be evaluated here");
                continue;
            }
            if !ticket.is_expired(now) {
                continue;
            }
            match ticket {
                Ticket::TicketGranting(_) => sessions.push(ticket),
                other => grants.push(other),
            }
        }

        let mut outcome = CleanupOutcome {
            executed: true,
            expired: sessions.len() + grants.len(),
            ..CleanupOutcome::default()
        };
        if outcome.expired == 0 {
            debug!("No expired tickets found");
            return Ok(outcome);
        }

        info!(count = outcome.expired, "Removing expired tickets");
        for ticket in sessions.iter().chain(grants.iter()) {
            match self.remove(ticket).await {
                Ok(removed) => outcome.removed += removed,
                Err(e) => {
                    outcome.failures += 1;
                    error!(ticket_id = %ticket.id(), error = %e, "Failed to remove an expired ticket, continuing");
                }
            }
        }

        info!(
            removed = outcome.removed,
            failures = outcome.failures,
            "Cleanup pass finished"
        );
        Ok(outcome)
    }

    /// Remove one expired ticket according to its kind.
    ///
    /// Sessions go through `delete_ticket` so logout fires and the cascade
    /// counts every dependent. Grants already swept by a cascade earlier in
    /// the pass count as zero here.
    async fn remove(&self, ticket: &Ticket) -> AppResult<u64> {
        match ticket {
            Ticket::TicketGranting(session) => self.registry.delete_ticket(&session.id).await,
            Ticket::Service(st) => Ok(u64::from(self.registry.delete_single(&st.id).await?)),
            Ticket::Proxy(pt) => Ok(u64::from(self.registry.delete_single(&pt.id).await?)),
            Ticket::Encoded(_) => Ok(0),
        }
    }
}

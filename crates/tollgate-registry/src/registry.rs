//! Ticket registry contract.

use async_trait::async_trait;
use tracing::debug;

use tollgate_core::result::AppResult;
use tollgate_ticket::{Ticket, TicketId};

/// Lookup predicate applied after a ticket is fetched.
///
/// Typically encodes "not expired" or "of kind X". A rejected ticket is
/// indistinguishable from an absent one to the caller.
pub type TicketPredicate<'a> = &'a (dyn Fn(&Ticket) -> bool + Send + Sync);

/// Trait for ticket storage backends (in-memory, Redis, or decorated).
///
/// Backend errors always surface to the caller; nothing is swallowed at
/// this layer. Atomicity of concurrent writes to the same id is the
/// backend's native consistency, no extra locking is added here.
#[async_trait]
pub trait TicketRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Store a newly created ticket. An identifier collision is a
    /// programming error and fails with a conflict, not a retry.
    async fn add_ticket(&self, ticket: Ticket) -> AppResult<()>;

    /// Fetch a ticket by id without applying any predicate.
    async fn fetch_ticket(&self, id: &TicketId) -> AppResult<Option<Ticket>>;

    /// Persist mutated use-count/last-used state. Returns the stored
    /// ticket.
    async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket>;

    /// Remove exactly one ticket. Returns whether it existed. No cascade;
    /// use [`TicketRegistry::delete_ticket`] to destroy a session.
    async fn delete_single(&self, id: &TicketId) -> AppResult<bool>;

    /// Enumerate every stored ticket. Only the cleanup pass calls this;
    /// backends may implement it inefficiently.
    async fn get_tickets(&self) -> AppResult<Vec<Ticket>>;

    /// Administrative bulk clear. Returns the number of removed tickets.
    async fn delete_all(&self) -> AppResult<u64>;

    /// Fetch a ticket and apply a predicate. Absent and rejected are the
    /// same observable outcome.
    async fn get_ticket(
        &self,
        id: &TicketId,
        predicate: TicketPredicate<'_>,
    ) -> AppResult<Option<Ticket>> {
        match self.fetch_ticket(id).await? {
            Some(ticket) if predicate(&ticket) => Ok(Some(ticket)),
            Some(_) => {
                debug!(ticket_id = %id, "Ticket rejected by predicate");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Remove a ticket and, for granting tickets, every service ticket it
    /// granted and every granting ticket chained under it. Returns the
    /// number of tickets actually removed (0 if absent).
    async fn delete_ticket(&self, id: &TicketId) -> AppResult<u64> {
        let Some(ticket) = self.fetch_ticket(id).await? else {
            debug!(ticket_id = %id, "Nothing to delete, ticket absent");
            return Ok(0);
        };

        let mut removed = 0u64;
        if let Ticket::TicketGranting(granting) = &ticket {
            for child_id in granting.services.keys() {
                if self.delete_single(child_id).await? {
                    removed += 1;
                }
            }
            for chained_id in &granting.proxy_granting_tickets {
                removed += self.delete_ticket(chained_id).await?;
            }
        }
        if self.delete_single(id).await? {
            removed += 1;
        }

        debug!(ticket_id = %id, removed, "Deleted ticket");
        Ok(removed)
    }
}

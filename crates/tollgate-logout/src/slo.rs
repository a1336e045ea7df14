//! Registry decorator that fires single logout on session destruction.

use std::sync::Arc;

use async_trait::async_trait;

use tollgate_core::config::logout::DispatchOrder;
use tollgate_core::result::AppResult;
use tollgate_registry::{TicketPredicate, TicketRegistry};
use tollgate_ticket::{Ticket, TicketId};

use crate::manager::LogoutManager;

/// Decorates a registry so that destroying a granting ticket notifies
/// every service it issued tickets to.
///
/// The dependency is explicit: callers holding this decorator get logout
/// on `delete_ticket`, callers holding the inner registry do not. The
/// order of notification relative to removal is configurable;
/// notify-first is the default so messages can still reference live
/// service tickets.
#[derive(Debug)]
pub struct SingleLogoutTicketRegistry {
    inner: Arc<dyn TicketRegistry>,
    logout_manager: Arc<dyn LogoutManager>,
    dispatch_order: DispatchOrder,
}

impl SingleLogoutTicketRegistry {
    /// Wrap a registry with logout dispatch.
    pub fn new(
        inner: Arc<dyn TicketRegistry>,
        logout_manager: Arc<dyn LogoutManager>,
        dispatch_order: DispatchOrder,
    ) -> Self {
        Self {
            inner,
            logout_manager,
            dispatch_order,
        }
    }
}

#[async_trait]
impl TicketRegistry for SingleLogoutTicketRegistry {
    async fn add_ticket(&self, ticket: Ticket) -> AppResult<()> {
        self.inner.add_ticket(ticket).await
    }

    async fn fetch_ticket(&self, id: &TicketId) -> AppResult<Option<Ticket>> {
        self.inner.fetch_ticket(id).await
    }

    async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket> {
        self.inner.update_ticket(ticket).await
    }

    async fn delete_single(&self, id: &TicketId) -> AppResult<bool> {
        self.inner.delete_single(id).await
    }

    async fn get_tickets(&self) -> AppResult<Vec<Ticket>> {
        self.inner.get_tickets().await
    }

    async fn delete_all(&self) -> AppResult<u64> {
        self.inner.delete_all().await
    }

    async fn get_ticket(
        &self,
        id: &TicketId,
        predicate: TicketPredicate<'_>,
    ) -> AppResult<Option<Ticket>> {
        self.inner.get_ticket(id, predicate).await
    }

    /// Destroy a ticket; granting tickets additionally trigger the logout
    /// fan-out. Notification outcome never affects the removal or the
    /// returned count.
    async fn delete_ticket(&self, id: &TicketId) -> AppResult<u64> {
        let Some(Ticket::TicketGranting(granting)) = self.inner.fetch_ticket(id).await? else {
            return self.inner.delete_ticket(id).await;
        };

        match self.dispatch_order {
            DispatchOrder::NotifyThenDelete => {
                self.logout_manager
                    .handle_session_termination(&granting)
                    .await;
                self.inner.delete_ticket(id).await
            }
            DispatchOrder::DeleteThenNotify => {
                let removed = self.inner.delete_ticket(id).await?;
                self.logout_manager
                    .handle_session_termination(&granting)
                    .await;
                Ok(removed)
            }
        }
    }
}

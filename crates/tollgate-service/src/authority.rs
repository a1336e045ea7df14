//! The central ticket operations: create, grant, validate, delegate,
//! destroy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_registry::TicketRegistry;
use tollgate_ticket::{
    Authentication, ServiceRef, Ticket, TicketFactory, TicketGrantingTicket, TicketId,
};

use crate::assertion::ValidationAssertion;

/// Issues and consumes tickets against the configured registry stack.
///
/// Expiry is enforced at every touch point: a session found expired while
/// granting is destroyed through the stack on the spot rather than left
/// for the cleanup pass.
#[derive(Debug)]
pub struct TicketAuthority {
    factory: TicketFactory,
    registry: Arc<dyn TicketRegistry>,
}

impl TicketAuthority {
    pub fn new(factory: TicketFactory, registry: Arc<dyn TicketRegistry>) -> Self {
        Self { factory, registry }
    }

    /// Open a new single-sign-on session.
    pub async fn create_ticket_granting_ticket(
        &self,
        authentication: Authentication,
    ) -> AppResult<TicketId> {
        let principal = authentication.principal.clone();
        let ticket = self.factory.create_ticket_granting_ticket(authentication);
        let id = ticket.id.clone();
        self.registry
            .add_ticket(Ticket::TicketGranting(ticket))
            .await?;

        info!(ticket_id = %id, principal = %principal, "Created ticket-granting ticket");
        Ok(id)
    }

    /// Grant a service ticket from a live session.
    pub async fn grant_service_ticket(
        &self,
        granting_ticket_id: &TicketId,
        service: ServiceRef,
        from_new_login: bool,
    ) -> AppResult<TicketId> {
        let mut granting = self.require_granting_ticket(granting_ticket_id).await?;
        self.destroy_if_expired(&granting, Utc::now()).await?;

        let ticket = self
            .factory
            .grant_service_ticket(&mut granting, service, from_new_login);
        let id = ticket.id.clone();

        self.registry.add_ticket(Ticket::Service(ticket)).await?;
        self.registry
            .update_ticket(Ticket::TicketGranting(granting))
            .await?;

        info!(ticket_id = %id, granting_ticket_id = %granting_ticket_id, "Granted service ticket");
        Ok(id)
    }

    /// Validate a service or proxy ticket on behalf of `service`.
    ///
    /// Consumes a use; a single-use ticket disappears once validated. The
    /// ticket must match the validating service, and the session behind it
    /// must still exist and be live.
    pub async fn validate_service_ticket(
        &self,
        service_ticket_id: &TicketId,
        service: &ServiceRef,
    ) -> AppResult<ValidationAssertion> {
        let now = Utc::now();
        match self.registry.fetch_ticket(service_ticket_id).await? {
            Some(Ticket::Service(ticket)) => {
                let granted = ticket.service.clone();
                let session_id = ticket.granting_ticket_id.clone();
                let from_new_login = ticket.from_new_login;
                self.finish_validation(
                    Ticket::Service(ticket),
                    granted,
                    session_id,
                    from_new_login,
                    service,
                    now,
                )
                .await
            }
            Some(Ticket::Proxy(ticket)) => {
                let granted = ticket.service.clone();
                let session_id = ticket.granting_ticket_id.clone();
                self.finish_validation(Ticket::Proxy(ticket), granted, session_id, false, service, now)
                    .await
            }
            Some(_) => Err(AppError::ticket_not_found(format!(
                "Ticket '{service_ticket_id}' cannot be validated as a service grant"
            ))),
            None => Err(AppError::ticket_not_found(format!(
                "Service ticket '{service_ticket_id}' not found"
            ))),
        }
    }

    /// Delegate a proxy-granting ticket from a service ticket.
    ///
    /// Delegation does not consume the service ticket; the new granting
    /// ticket chains under the same session, so destroying the session
    /// still sweeps the whole proxy chain.
    pub async fn delegate_proxy_granting_ticket(
        &self,
        service_ticket_id: &TicketId,
        authentication: Authentication,
    ) -> AppResult<TicketId> {
        let now = Utc::now();
        let service_ticket = match self.registry.fetch_ticket(service_ticket_id).await? {
            Some(Ticket::Service(ticket)) => ticket,
            Some(_) => {
                return Err(AppError::ticket_not_found(format!(
                    "Ticket '{service_ticket_id}' is not a service ticket"
                )));
            }
            None => {
                return Err(AppError::ticket_not_found(format!(
                    "Service ticket '{service_ticket_id}' not found"
                )));
            }
        };
        if service_ticket.is_expired(now) {
            return Err(AppError::ticket_expired(format!(
                "Service ticket '{service_ticket_id}' has expired"
            )));
        }

        let mut parent = self
            .require_granting_ticket(&service_ticket.granting_ticket_id)
            .await?;
        self.destroy_if_expired(&parent, now).await?;

        let ticket =
            self.factory
                .delegate_proxy_granting_ticket(&service_ticket, &mut parent, authentication);
        let id = ticket.id.clone();

        self.registry
            .add_ticket(Ticket::TicketGranting(ticket))
            .await?;
        self.registry
            .update_ticket(Ticket::TicketGranting(parent))
            .await?;

        info!(ticket_id = %id, service_ticket_id = %service_ticket_id, "Delegated proxy-granting ticket");
        Ok(id)
    }

    /// Grant a proxy ticket from a proxy-granting ticket.
    pub async fn grant_proxy_ticket(
        &self,
        proxy_granting_ticket_id: &TicketId,
        service: ServiceRef,
    ) -> AppResult<TicketId> {
        let mut granting = self
            .require_granting_ticket(proxy_granting_ticket_id)
            .await?;
        if granting.is_root() {
            return Err(AppError::conflict(format!(
                "Ticket '{proxy_granting_ticket_id}' is not a proxy-granting ticket"
            )));
        }
        self.destroy_if_expired(&granting, Utc::now()).await?;

        let ticket = self.factory.grant_proxy_ticket(&mut granting, service);
        let id = ticket.id.clone();

        self.registry.add_ticket(Ticket::Proxy(ticket)).await?;
        self.registry
            .update_ticket(Ticket::TicketGranting(granting))
            .await?;

        info!(ticket_id = %id, proxy_granting_ticket_id = %proxy_granting_ticket_id, "Granted proxy ticket");
        Ok(id)
    }

    /// End a session, cascading through everything it granted.
    ///
    /// Returns the number of tickets removed. Whether services are
    /// notified first or after removal follows how the registry stack was
    /// assembled.
    pub async fn destroy_ticket_granting_ticket(
        &self,
        granting_ticket_id: &TicketId,
    ) -> AppResult<u64> {
        let removed = self.registry.delete_ticket(granting_ticket_id).await?;
        info!(ticket_id = %granting_ticket_id, removed, "Destroyed ticket-granting ticket");
        Ok(removed)
    }

    async fn require_granting_ticket(&self, id: &TicketId) -> AppResult<TicketGrantingTicket> {
        match self.registry.fetch_ticket(id).await? {
            Some(Ticket::TicketGranting(ticket)) => Ok(ticket),
            Some(_) => Err(AppError::ticket_not_found(format!(
                "Ticket '{id}' is not a ticket-granting ticket"
            ))),
            None => Err(AppError::ticket_not_found(format!(
                "Ticket-granting ticket '{id}' not found"
            ))),
        }
    }

    /// Destroy a session found expired mid-operation and fail the caller.
    async fn destroy_if_expired(
        &self,
        granting: &TicketGrantingTicket,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if !granting.is_expired(now) {
            return Ok(());
        }
        warn!(ticket_id = %granting.id, "Session expired at grant time, destroying it");
        self.registry.delete_ticket(&granting.id).await?;
        Err(AppError::ticket_expired(format!(
            "Ticket-granting ticket '{}' has expired",
            granting.id
        )))
    }

    async fn finish_validation(
        &self,
        mut ticket: Ticket,
        granted_service: ServiceRef,
        session_id: TicketId,
        from_new_login: bool,
        service: &ServiceRef,
        now: DateTime<Utc>,
    ) -> AppResult<ValidationAssertion> {
        let ticket_id = ticket.id().clone();

        if ticket.is_expired(now) {
            return Err(AppError::ticket_expired(format!(
                "Service ticket '{ticket_id}' has expired"
            )));
        }
        if granted_service.id != service.id {
            return Err(AppError::conflict(format!(
                "Service ticket '{ticket_id}' was granted to '{}', not '{}'",
                granted_service.id, service.id
            )));
        }

        let session = match self.registry.fetch_ticket(&session_id).await? {
            Some(Ticket::TicketGranting(session)) if !session.is_expired(now) => session,
            _ => {
                return Err(AppError::ticket_expired(format!(
                    "The session behind service ticket '{ticket_id}' has ended"
                )));
            }
        };

        ticket.record_use(now);
        if ticket.is_expired(now) {
            // Spent; single-use grants disappear on successful validation.
            self.registry.delete_single(&ticket_id).await?;
        } else {
            self.registry.update_ticket(ticket).await?;
        }

        info!(
            ticket_id = %ticket_id,
            service = %service.id,
            principal = %session.authentication.principal,
            "Validated service ticket"
        );

        Ok(ValidationAssertion {
            authentication: session.authentication,
            service: granted_service,
            from_new_login,
        })
    }
}

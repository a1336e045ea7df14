//! Ticket construction.
//!
//! The factory is the only place tickets are born: it assigns identifiers,
//! stamps timestamps, and binds the configured expiration policy for each
//! kind. Granting a ticket also registers it with its parent, so the
//! session always knows every grant it made.

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use tollgate_core::config::ticket::TicketConfig;

use crate::authentication::Authentication;
use crate::expiry::ExpirationPolicy;
use crate::id::{TicketIdGenerator, TicketKind};
use crate::service::ServiceRef;
use crate::ticket::{ProxyTicket, ServiceTicket, TicketGrantingTicket};

/// Builds tickets with unique ids and configured policies.
#[derive(Debug)]
pub struct TicketFactory {
    id_generator: TicketIdGenerator,
    config: TicketConfig,
}

impl TicketFactory {
    /// Create a factory from ticket configuration.
    pub fn new(config: TicketConfig) -> Self {
        Self {
            id_generator: TicketIdGenerator::new(&config),
            config,
        }
    }

    /// Create the root ticket of a new SSO session.
    pub fn create_ticket_granting_ticket(
        &self,
        authentication: Authentication,
    ) -> TicketGrantingTicket {
        let now = Utc::now();
        TicketGrantingTicket {
            id: self.id_generator.next_id(TicketKind::TicketGranting),
            authentication,
            parent_id: None,
            proxied_by: None,
            services: HashMap::new(),
            proxy_granting_tickets: HashSet::new(),
            expiration_policy: ExpirationPolicy::SessionWindow {
                idle_seconds: self.config.tgt.idle_seconds,
                max_lifetime_seconds: self.config.tgt.max_lifetime_seconds,
            },
            expired: false,
            created_at: now,
            last_used_at: now,
            use_count: 0,
        }
    }

    /// Grant a service ticket from a live session.
    ///
    /// Registers the grant in the session's service map and refreshes the
    /// session's idle window.
    pub fn grant_service_ticket(
        &self,
        granting_ticket: &mut TicketGrantingTicket,
        service: ServiceRef,
        from_new_login: bool,
    ) -> ServiceTicket {
        let now = Utc::now();
        let ticket = ServiceTicket {
            id: self.id_generator.next_id(TicketKind::Service),
            service: service.clone(),
            granting_ticket_id: granting_ticket.id.clone(),
            from_new_login,
            expiration_policy: ExpirationPolicy::UseCountOrTimeout {
                max_uses: self.config.st.max_uses,
                ttl_seconds: self.config.st.ttl_seconds,
            },
            created_at: now,
            last_used_at: now,
            use_count: 0,
        };

        granting_ticket.record_use(now);
        granting_ticket
            .services
            .insert(ticket.id.clone(), service);
        ticket
    }

    /// Delegate a proxy-granting ticket from a service ticket.
    ///
    /// `parent` must be the session that issued `service_ticket`. The new
    /// granting ticket chains under it and is registered there so session
    /// destruction cascades through the whole proxy chain.
    pub fn delegate_proxy_granting_ticket(
        &self,
        service_ticket: &ServiceTicket,
        parent: &mut TicketGrantingTicket,
        authentication: Authentication,
    ) -> TicketGrantingTicket {
        let now = Utc::now();
        let ticket = TicketGrantingTicket {
            id: self.id_generator.next_id(TicketKind::ProxyGranting),
            authentication,
            parent_id: Some(parent.id.clone()),
            proxied_by: Some(service_ticket.service.clone()),
            services: HashMap::new(),
            proxy_granting_tickets: HashSet::new(),
            expiration_policy: ExpirationPolicy::SessionWindow {
                idle_seconds: self.config.pgt.idle_seconds,
                max_lifetime_seconds: self.config.pgt.max_lifetime_seconds,
            },
            expired: false,
            created_at: now,
            last_used_at: now,
            use_count: 0,
        };

        parent.proxy_granting_tickets.insert(ticket.id.clone());
        ticket
    }

    /// Grant a proxy ticket from a proxy-granting ticket.
    pub fn grant_proxy_ticket(
        &self,
        proxy_granting_ticket: &mut TicketGrantingTicket,
        service: ServiceRef,
    ) -> ProxyTicket {
        let now = Utc::now();
        let ticket = ProxyTicket {
            id: self.id_generator.next_id(TicketKind::Proxy),
            service: service.clone(),
            granting_ticket_id: proxy_granting_ticket.id.clone(),
            expiration_policy: ExpirationPolicy::UseCountOrTimeout {
                max_uses: self.config.pt.max_uses,
                ttl_seconds: self.config.pt.ttl_seconds,
            },
            created_at: now,
            last_used_at: now,
            use_count: 0,
        };

        proxy_granting_ticket.record_use(now);
        proxy_granting_ticket
            .services
            .insert(ticket.id.clone(), service);
        ticket
    }
}

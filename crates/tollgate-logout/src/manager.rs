//! Session termination fan-out.
//!
//! One pass per destroyed session: resolve a destination per visited
//! service, build a message per destination, deliver with bounded
//! concurrency, aggregate. Every failure is isolated to its destination;
//! the pass as a whole never fails.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use tollgate_core::config::logout::LogoutConfig;
use tollgate_ticket::TicketGrantingTicket;

use crate::handler::{BackChannelLogoutHandler, FrontChannelLogoutHandler, LogoutMessageHandler};
use crate::message::{DefaultLogoutMessageBuilder, LogoutMessageBuilder};
use crate::request::{LogoutRequest, LogoutRequestStatus};
use crate::url::{DefaultLogoutUrlResolver, LogoutUrlResolver, StaticLogoutUrlResolver};

/// Notifies every service a destroyed session issued tickets to.
#[async_trait]
pub trait LogoutManager: Send + Sync + fmt::Debug + 'static {
    /// Fan out session-termination notices for the granting ticket.
    ///
    /// Infallible by design: per-destination failures are recorded in the
    /// returned requests, and callers proceed with ticket destruction no
    /// matter what comes back.
    async fn handle_session_termination(
        &self,
        ticket: &TicketGrantingTicket,
    ) -> Vec<LogoutRequest>;
}

/// Default fan-out over a resolver chain, a message builder, and a
/// handler chain.
#[derive(Debug)]
pub struct DefaultLogoutManager {
    disabled: bool,
    concurrency: usize,
    resolvers: Vec<Arc<dyn LogoutUrlResolver>>,
    message_builder: Arc<dyn LogoutMessageBuilder>,
    handlers: Vec<Arc<dyn LogoutMessageHandler>>,
}

impl DefaultLogoutManager {
    /// Assemble a manager from explicit chain members.
    ///
    /// Chains are sorted ascending by `order`; members with equal order
    /// keep their insertion order.
    pub fn new(
        config: &LogoutConfig,
        mut resolvers: Vec<Arc<dyn LogoutUrlResolver>>,
        message_builder: Arc<dyn LogoutMessageBuilder>,
        mut handlers: Vec<Arc<dyn LogoutMessageHandler>>,
    ) -> Self {
        resolvers.sort_by_key(|resolver| resolver.order());
        handlers.sort_by_key(|handler| handler.order());
        Self {
            disabled: config.disabled,
            concurrency: config.concurrency.max(1),
            resolvers,
            message_builder,
            handlers,
        }
    }

    /// Default chains: configured logout URLs first with the service's own
    /// URL as fallback; back-channel delivery plus front-channel staging.
    ///
    /// The front-channel handler is returned separately so the web tier
    /// can drain staged redirects from it.
    pub fn from_config(config: &LogoutConfig) -> (Self, Arc<FrontChannelLogoutHandler>) {
        let front_channel = Arc::new(FrontChannelLogoutHandler::new());
        let manager = Self::new(
            config,
            vec![
                Arc::new(StaticLogoutUrlResolver::from_config(config)),
                Arc::new(DefaultLogoutUrlResolver::from_config(config)),
            ],
            Arc::new(DefaultLogoutMessageBuilder),
            vec![
                Arc::new(BackChannelLogoutHandler::from_config(config)),
                front_channel.clone(),
            ],
        );
        (manager, front_channel)
    }

    /// Resolve one request per (service ticket, destination) pair.
    ///
    /// A service without a supporting resolver is skipped; a resolver
    /// error produces a failed request so the loss shows up in the
    /// aggregate instead of silently narrowing it.
    fn resolve_destinations(&self, ticket: &TicketGrantingTicket) -> Vec<LogoutRequest> {
        let mut requests = Vec::new();
        for (ticket_id, service) in &ticket.services {
            let Some(resolver) = self
                .resolvers
                .iter()
                .find(|resolver| resolver.supports(service))
            else {
                debug!(service_id = %service.id, "No resolver supports service, skipping logout");
                continue;
            };

            match resolver.resolve(service) {
                Ok(destinations) => {
                    if destinations.is_empty() {
                        debug!(service_id = %service.id, "Resolver produced no logout destinations");
                    }
                    for destination in destinations {
                        requests.push(LogoutRequest::new(
                            ticket_id.clone(),
                            service.clone(),
                            destination,
                        ));
                    }
                }
                Err(e) => {
                    warn!(service_id = %service.id, error = %e, "Logout URL resolution failed");
                    requests.push(LogoutRequest::failed(ticket_id.clone(), service.clone()));
                }
            }
        }
        requests
    }

    /// Build and deliver messages, destinations in parallel under the
    /// concurrency limit. Statuses are written back into `requests`.
    async fn dispatch(&self, requests: &mut [LogoutRequest]) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: Vec<(usize, tokio::task::JoinHandle<LogoutRequestStatus>)> = Vec::new();
        let mut build_failures: Vec<usize> = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            if request.status != LogoutRequestStatus::NotAttempted {
                continue;
            }

            let Some(handler) = self
                .handlers
                .iter()
                .find(|handler| handler.supports(request))
                .cloned()
            else {
                debug!(service_id = %request.service.id, "No handler supports logout request");
                continue;
            };

            let message = match self.message_builder.build(request) {
                Ok(message) => message,
                Err(e) => {
                    warn!(service_id = %request.service.id, error = %e, "Failed to build logout message");
                    build_failures.push(index);
                    continue;
                }
            };

            let semaphore = semaphore.clone();
            let request = request.clone();
            tasks.push((
                index,
                tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire().await else {
                        return LogoutRequestStatus::Failure;
                    };
                    handler.handle(&request, &message).await
                }),
            ));
        }

        for index in build_failures {
            requests[index].status = LogoutRequestStatus::Failure;
        }

        for (index, task) in tasks {
            match task.await {
                Ok(status) => requests[index].status = status,
                Err(e) => {
                    warn!(error = %e, "Logout dispatch task failed to complete");
                    requests[index].status = LogoutRequestStatus::Failure;
                }
            }
        }
    }
}

#[async_trait]
impl LogoutManager for DefaultLogoutManager {
    async fn handle_session_termination(
        &self,
        ticket: &TicketGrantingTicket,
    ) -> Vec<LogoutRequest> {
        if self.disabled {
            debug!(ticket_id = %ticket.id, "Single logout is disabled, skipping notification");
            return Vec::new();
        }
        if ticket.services.is_empty() {
            debug!(ticket_id = %ticket.id, "Session issued no service tickets, nothing to notify");
            return Vec::new();
        }

        let mut requests = self.resolve_destinations(ticket);
        self.dispatch(&mut requests).await;

        let delivered = requests
            .iter()
            .filter(|r| r.status == LogoutRequestStatus::Success)
            .count();
        let failed = requests
            .iter()
            .filter(|r| r.status == LogoutRequestStatus::Failure)
            .count();
        let staged = requests
            .iter()
            .filter(|r| r.status == LogoutRequestStatus::NotAttempted)
            .count();
        info!(
            ticket_id = %ticket.id,
            total = requests.len(),
            delivered,
            failed,
            staged,
            "Completed single logout fan-out"
        );
        requests
    }
}

//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tollgate_core::config::logout::LogoutConfig;
use tollgate_core::config::ticket::TicketConfig;
use tollgate_logout::{
    DefaultLogoutManager, DefaultLogoutMessageBuilder, DefaultLogoutUrlResolver,
    LogoutMessageHandler, LogoutRequest, LogoutRequestStatus, LogoutUrlResolver,
    SingleLogoutTicketRegistry, StaticLogoutUrlResolver,
};
use tollgate_registry::{InMemoryTicketRegistry, TicketRegistry};
use tollgate_service::TicketAuthority;
use tollgate_ticket::{Authentication, ServiceRef, TicketFactory};

/// Logout handler that records deliveries instead of calling anything.
#[derive(Debug, Default)]
pub struct RecordingLogoutHandler {
    delivered: Mutex<Vec<(String, String)>>,
}

impl RecordingLogoutHandler {
    /// The `(service id, message body)` pairs delivered so far.
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    /// Service ids notified so far, sorted for comparison.
    pub fn notified_services(&self) -> Vec<String> {
        let mut services: Vec<String> = self
            .deliveries()
            .into_iter()
            .map(|(service, _)| service)
            .collect();
        services.sort();
        services
    }
}

#[async_trait]
impl LogoutMessageHandler for RecordingLogoutHandler {
    fn supports(&self, _request: &LogoutRequest) -> bool {
        true
    }

    async fn handle(&self, request: &LogoutRequest, message: &str) -> LogoutRequestStatus {
        self.delivered
            .lock()
            .unwrap()
            .push((request.service.id.clone(), message.to_string()));
        LogoutRequestStatus::Success
    }
}

/// The full ticket stack over an in-memory backend, with logout deliveries
/// captured by a [`RecordingLogoutHandler`] instead of going over the wire.
pub struct TestStack {
    /// The raw backend, for seeding and direct inspection.
    pub backend: Arc<InMemoryTicketRegistry>,
    /// The logout-decorated registry every component writes through.
    pub registry: Arc<dyn TicketRegistry>,
    /// Ticket operations facade over the decorated registry.
    pub authority: TicketAuthority,
    /// Every logout delivery, in dispatch order.
    pub logout: Arc<RecordingLogoutHandler>,
}

impl TestStack {
    /// A stack with default configuration: single-use service tickets,
    /// logout enabled, notify before delete.
    pub fn new() -> Self {
        Self::with_logout_config(LogoutConfig::default())
    }

    /// A stack with explicit logout configuration.
    pub fn with_logout_config(config: LogoutConfig) -> Self {
        let backend = Arc::new(InMemoryTicketRegistry::new());
        let logout = Arc::new(RecordingLogoutHandler::default());

        let resolvers: Vec<Arc<dyn LogoutUrlResolver>> = vec![
            Arc::new(StaticLogoutUrlResolver::from_config(&config)),
            Arc::new(DefaultLogoutUrlResolver::from_config(&config)),
        ];
        let handlers: Vec<Arc<dyn LogoutMessageHandler>> = vec![logout.clone()];
        let manager = DefaultLogoutManager::new(
            &config,
            resolvers,
            Arc::new(DefaultLogoutMessageBuilder),
            handlers,
        );

        let registry: Arc<dyn TicketRegistry> = Arc::new(SingleLogoutTicketRegistry::new(
            backend.clone(),
            Arc::new(manager),
            config.dispatch_order,
        ));
        let authority = TicketAuthority::new(
            TicketFactory::new(TicketConfig::default()),
            registry.clone(),
        );

        Self {
            backend,
            registry,
            authority,
            logout,
        }
    }
}

/// A service living at its own https URL, so the fallback resolver
/// produces a back-channel destination for it.
pub fn service(id: &str) -> ServiceRef {
    ServiceRef::new(id, format!("https://{id}.example.org/"))
}

/// An authentication record for a principal, stamped now.
pub fn login(principal: &str) -> Authentication {
    Authentication::new(principal)
}

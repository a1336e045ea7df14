//! Registry manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use tollgate_core::config::registry::RegistryConfig;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_ticket::{Ticket, TicketId};

use crate::cipher::AesGcmTicketCipher;
use crate::encrypted::EncryptedTicketRegistry;
use crate::registry::{TicketPredicate, TicketRegistry};

/// Registry manager that wraps the configured ticket registry.
///
/// The backend is selected at construction time based on configuration.
/// When at-rest encryption is enabled the backend is wrapped in
/// [`EncryptedTicketRegistry`] here, so every consumer of the manager
/// observes logical tickets regardless of what the backend stores.
#[derive(Debug, Clone)]
pub struct RegistryManager {
    /// The inner ticket registry.
    inner: Arc<dyn TicketRegistry>,
}

impl RegistryManager {
    /// Create a new registry manager from configuration.
    pub async fn new(config: &RegistryConfig) -> AppResult<Self> {
        let backend: Arc<dyn TicketRegistry> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis ticket registry");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisTicketRegistry::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory ticket registry");
                Arc::new(crate::memory::InMemoryTicketRegistry::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown registry provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        let inner: Arc<dyn TicketRegistry> = if config.crypto.enabled {
            info!(order = ?config.crypto.order, "Ticket encryption at rest enabled");
            let cipher = Arc::new(AesGcmTicketCipher::from_config(&config.crypto)?);
            Arc::new(EncryptedTicketRegistry::new(backend, cipher))
        } else {
            backend
        };

        Ok(Self { inner })
    }

    /// Create a registry manager from an existing registry (for testing).
    pub fn from_registry(registry: Arc<dyn TicketRegistry>) -> Self {
        Self { inner: registry }
    }

    /// Get a reference to the inner registry.
    pub fn registry(&self) -> &dyn TicketRegistry {
        self.inner.as_ref()
    }

    /// Clone the inner registry handle for composition with decorators.
    pub fn shared(&self) -> Arc<dyn TicketRegistry> {
        self.inner.clone()
    }
}

#[async_trait]
impl TicketRegistry for RegistryManager {
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

    async fn delete_ticket(&self, id: &TicketId) -> AppResult<u64> {
        self.inner.delete_ticket(id).await
    }
}

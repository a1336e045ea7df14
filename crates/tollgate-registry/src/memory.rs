//! In-memory ticket registry for single-node deployments and tests.
//!
//! Backed by a plain concurrent map with no eviction of its own: tickets
//! leave the registry only through deletion, so the cleanup pass always
//! observes expired tickets and can fire logout for them.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_ticket::{Ticket, TicketId};

use crate::registry::TicketRegistry;

/// In-memory ticket registry.
#[derive(Debug, Default)]
pub struct InMemoryTicketRegistry {
    tickets: DashMap<TicketId, Ticket>,
}

impl InMemoryTicketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[async_trait]
impl TicketRegistry for InMemoryTicketRegistry {
    async fn add_ticket(&self, ticket: Ticket) -> AppResult<()> {
        match self.tickets.entry(ticket.id().clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Ticket id collision: '{}' already stored",
                ticket.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                Ok(())
            }
        }
    }

    async fn fetch_ticket(&self, id: &TicketId) -> AppResult<Option<Ticket>> {
        Ok(self.tickets.get(id).map(|entry| entry.value().clone()))
    }

    async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket> {
        self.tickets.insert(ticket.id().clone(), ticket.clone());
        Ok(ticket)
    }

    async fn delete_single(&self, id: &TicketId) -> AppResult<bool> {
        Ok(self.tickets.remove(id).is_some())
    }

    async fn get_tickets(&self) -> AppResult<Vec<Ticket>> {
        Ok(self
            .tickets
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let count = self.tickets.len() as u64;
        self.tickets.clear();
        Ok(count)
    }
}

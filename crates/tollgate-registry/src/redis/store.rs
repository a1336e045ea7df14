//! Redis ticket registry implementation.
//!
//! Tickets are stored as JSON under their id with no Redis-side TTL:
//! expiry is a pure function of ticket state, and the cleanup pass must be
//! able to observe expired tickets to fire logout before deletion. Letting
//! Redis evict them would skip that step.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_ticket::{Ticket, TicketId};

use crate::registry::TicketRegistry;

use super::client::RedisClient;

/// Redis-backed ticket registry.
#[derive(Debug, Clone)]
pub struct RedisTicketRegistry {
    /// Redis client.
    client: RedisClient,
}

impl RedisTicketRegistry {
    /// Create a new Redis ticket registry.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Registry, format!("Redis error: {e}"), e)
    }

    /// Parse a stored row, warning and skipping rows that fail to decode.
    fn parse_row(&self, key: &str, raw: &str) -> Option<Ticket> {
        match serde_json::from_str(raw) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(key, error = %e, "Skipping undecodable ticket row");
                None
            }
        }
    }
}

#[async_trait]
impl TicketRegistry for RedisTicketRegistry {
    async fn add_ticket(&self, ticket: Ticket) -> AppResult<()> {
        let full_key = self.client.prefixed_key(ticket.id().as_str());
        let value = serde_json::to_string(&ticket)?;
        let mut conn = self.client.conn_mut();

        // SET key value NX: first writer wins.
        let stored: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(&value)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if stored.is_none() {
            return Err(AppError::conflict(format!(
                "Ticket id collision: '{}' already stored",
                ticket.id()
            )));
        }
        Ok(())
    }

    async fn fetch_ticket(&self, id: &TicketId) -> AppResult<Option<Ticket>> {
        let full_key = self.client.prefixed_key(id.as_str());
        let mut conn = self.client.conn_mut();
        let raw: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(raw.and_then(|raw| self.parse_row(&full_key, &raw)))
    }

    async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket> {
        let full_key = self.client.prefixed_key(ticket.id().as_str());
        let value = serde_json::to_string(&ticket)?;
        let mut conn = self.client.conn_mut();
        let _: () = conn.set(&full_key, value).await.map_err(Self::map_err)?;
        Ok(ticket)
    }

    async fn delete_single(&self, id: &TicketId) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(id.as_str());
        let mut conn = self.client.conn_mut();
        let removed: i64 = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn get_tickets(&self) -> AppResult<Vec<Ticket>> {
        let pattern = self.client.prefixed_key("*");
        let mut conn = self.client.conn_mut();

        // Full scan; ticket cardinality is bounded by live sessions.
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let mut tickets = Vec::with_capacity(keys.len());
        for key in &keys {
            let raw: Option<String> = conn.get(key).await.map_err(Self::map_err)?;
            if let Some(raw) = raw {
                if let Some(ticket) = self.parse_row(key, &raw) {
                    tickets.push(ticket);
                }
            }
        }
        Ok(tickets)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let pattern = self.client.prefixed_key("*");
        let mut conn = self.client.conn_mut();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if keys.is_empty() {
            return Ok(0);
        }

        let mut count = 0u64;
        for key in &keys {
            let removed: i64 = conn.del(key).await.map_err(Self::map_err)?;
            count += removed as u64;
        }
        Ok(count)
    }
}

//! Encrypting registry decorator.
//!
//! Wraps any [`TicketRegistry`] so that storage keys are one-way SHA-512
//! hashes of the logical ticket id and stored values are [`EncodedTicket`]
//! carriers produced by a [`TicketCipher`]. A backend compromise yields
//! neither usable ticket ids nor readable ticket state.
//!
//! Reads fail closed: a payload that does not verify and decrypt is
//! reported as absent, never served corrupted.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha512};
use tracing::warn;

use tollgate_core::result::AppResult;
use tollgate_ticket::{EncodedTicket, Ticket, TicketId};

use crate::cipher::TicketCipher;
use crate::registry::TicketRegistry;

/// Registry decorator applying at-rest encryption and key hashing.
#[derive(Debug)]
pub struct EncryptedTicketRegistry {
    inner: Arc<dyn TicketRegistry>,
    cipher: Arc<dyn TicketCipher>,
}

impl EncryptedTicketRegistry {
    /// Wrap a backend registry with the given cipher.
    pub fn new(inner: Arc<dyn TicketRegistry>, cipher: Arc<dyn TicketCipher>) -> Self {
        Self { inner, cipher }
    }

    /// One-way storage id: lowercase hex SHA-512 of the logical id.
    fn hash_id(id: &TicketId) -> TicketId {
        let digest = Sha512::digest(id.as_str().as_bytes());
        let hex = digest.iter().fold(String::with_capacity(128), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        });
        TicketId::new(hex)
    }

    fn encode_ticket(&self, ticket: &Ticket) -> AppResult<Ticket> {
        let serialized = serde_json::to_vec(ticket)?;
        let payload = self.cipher.encode(&serialized)?;
        Ok(Ticket::Encoded(EncodedTicket {
            id: Self::hash_id(ticket.id()),
            payload,
        }))
    }

    /// Decode a stored carrier back to the logical ticket.
    ///
    /// Verification or deserialization failure discards the ticket with a
    /// warning. A plain ticket under an encrypting registry was stored
    /// before encryption was switched on and is served unchanged.
    fn decode_ticket(&self, ticket: Ticket) -> Option<Ticket> {
        let encoded = match ticket {
            Ticket::Encoded(encoded) => encoded,
            other => {
                warn!(
                    ticket_id = %other.id(),
                    "Found an unencrypted ticket in an encrypting registry"
                );
                return Some(other);
            }
        };

        let serialized = match self.cipher.decode(&encoded.payload) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(
                    storage_id = %encoded.id,
                    error = %e,
                    "Discarding ticket payload that failed verification"
                );
                return None;
            }
        };

        match serde_json::from_slice(&serialized) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(
                    storage_id = %encoded.id,
                    error = %e,
                    "Discarding ticket payload that failed deserialization"
                );
                None
            }
        }
    }
}

#[async_trait]
impl TicketRegistry for EncryptedTicketRegistry {
    async fn add_ticket(&self, ticket: Ticket) -> AppResult<()> {
        let encoded = self.encode_ticket(&ticket)?;
        self.inner.add_ticket(encoded).await
    }

    async fn fetch_ticket(&self, id: &TicketId) -> AppResult<Option<Ticket>> {
        let stored = self.inner.fetch_ticket(&Self::hash_id(id)).await?;
        Ok(stored.and_then(|ticket| self.decode_ticket(ticket)))
    }

    async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket> {
        let encoded = self.encode_ticket(&ticket)?;
        self.inner.update_ticket(encoded).await?;
        Ok(ticket)
    }

    async fn delete_single(&self, id: &TicketId) -> AppResult<bool> {
        self.inner.delete_single(&Self::hash_id(id)).await
    }

    async fn get_tickets(&self) -> AppResult<Vec<Ticket>> {
        let stored = self.inner.get_tickets().await?;
        Ok(stored
            .into_iter()
            .filter_map(|ticket| self.decode_ticket(ticket))
            .collect())
    }

    async fn delete_all(&self) -> AppResult<u64> {
        self.inner.delete_all().await
    }
}

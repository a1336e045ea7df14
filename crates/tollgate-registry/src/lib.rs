//! # tollgate-registry
//!
//! Ticket storage for Tollgate:
//! - The kind-agnostic [`TicketRegistry`] contract with predicate lookup and
//!   cascading session deletion
//! - An in-memory adapter and a Redis adapter (feature `redis-backend`)
//! - The [`TicketCipher`] abstraction with an AES-256-GCM + HMAC-SHA256
//!   implementation
//! - The encrypting decorator that hashes storage keys and encrypts payloads
//!   before they reach any backend
//!
//! Adapters are selected by configuration through [`RegistryManager`].

pub mod cipher;
pub mod encrypted;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod registry;

pub use cipher::{AesGcmTicketCipher, TicketCipher};
pub use encrypted::EncryptedTicketRegistry;
#[cfg(feature = "memory")]
pub use memory::InMemoryTicketRegistry;
pub use provider::RegistryManager;
pub use registry::{TicketPredicate, TicketRegistry};

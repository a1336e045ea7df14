//! Typed ticket identifiers.
//!
//! Every ticket id carries its kind as a prefix (`TGT-`, `PGT-`, `ST-`,
//! `PT-`), so any node can classify an id without fetching the ticket.
//! Generated ids append a per-process sequence, a random alphanumeric tail,
//! and a host suffix; tail plus host keep ids from colliding across nodes.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use tollgate_core::config::ticket::TicketConfig;

/// The closed set of ticket kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Root of an SSO session.
    TicketGranting,
    /// Granting ticket delegated to a service acting on the user's behalf.
    ProxyGranting,
    /// Single-service access grant backed by a granting ticket.
    Service,
    /// Access grant issued through a proxy-granting ticket.
    Proxy,
}

impl TicketKind {
    /// The id prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::TicketGranting => "TGT",
            Self::ProxyGranting => "PGT",
            Self::Service => "ST",
            Self::Proxy => "PT",
        }
    }

    /// Parse a kind from an id prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "TGT" => Some(Self::TicketGranting),
            "PGT" => Some(Self::ProxyGranting),
            "ST" => Some(Self::Service),
            "PT" => Some(Self::Proxy),
            _ => None,
        }
    }

    /// Whether this kind can grant further tickets.
    pub fn is_granting(&self) -> bool {
        matches!(self, Self::TicketGranting | Self::ProxyGranting)
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Logical ticket identifier.
///
/// Immutable once assigned. The encrypting registry decorator replaces it
/// with a one-way hash at the storage boundary; everywhere else the logical
/// id flows unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub String);

impl TicketId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The kind encoded in the id prefix, if the prefix is recognized.
    pub fn kind(&self) -> Option<TicketKind> {
        let prefix = self.0.split('-').next()?;
        TicketKind::from_prefix(prefix)
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TicketId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> String {
        id.0
    }
}

/// Generates unique ticket identifiers.
///
/// Format: `PREFIX-<sequence>-<random tail>-<host>`.
#[derive(Debug)]
pub struct TicketIdGenerator {
    counter: AtomicU64,
    tail_length: usize,
    host: String,
}

impl TicketIdGenerator {
    /// Create a generator from ticket configuration.
    pub fn new(config: &TicketConfig) -> Self {
        Self {
            counter: AtomicU64::new(0),
            tail_length: config.tail_length,
            host: config.host.clone(),
        }
    }

    /// Produce the next identifier for the given kind.
    pub fn next_id(&self, kind: TicketKind) -> TicketId {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let tail: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.tail_length)
            .map(char::from)
            .collect();

        TicketId::new(format!(
            "{}-{}-{}-{}",
            kind.prefix(),
            sequence,
            tail,
            self.host
        ))
    }
}

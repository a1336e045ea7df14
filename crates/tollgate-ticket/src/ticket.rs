//! Ticket variants and the closed ticket set.
//!
//! Kinds are a tagged enum rather than an open hierarchy: every consumer
//! matches exhaustively, so adding a kind is a compile-time-checked change.
//! Identifiers and parent linkage never change after creation; only
//! use-count and last-used time advance.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authentication::Authentication;
use crate::expiry::{ExpirationPolicy, TicketActivity};
use crate::id::{TicketId, TicketKind};
use crate::service::ServiceRef;

/// Root of an SSO session.
///
/// A granting ticket with `parent_id` set is a proxy-granting ticket:
/// the same structure, chained under another session and marked with the
/// service the delegation was issued to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketGrantingTicket {
    /// Ticket identifier (`TGT-` or `PGT-` prefixed).
    pub id: TicketId,
    /// Authentication this session was established from.
    pub authentication: Authentication,
    /// Owning granting ticket when this is a proxy-granting ticket.
    pub parent_id: Option<TicketId>,
    /// Service the delegation was issued to (proxy-granting only).
    pub proxied_by: Option<ServiceRef>,
    /// Every service ticket this session granted, keyed by ticket id.
    #[serde(default)]
    pub services: HashMap<TicketId, ServiceRef>,
    /// Proxy-granting tickets chained under this session.
    #[serde(default)]
    pub proxy_granting_tickets: HashSet<TicketId>,
    /// Expiration policy bound at creation.
    pub expiration_policy: ExpirationPolicy,
    /// Explicit revocation mark; set on destruction and never cleared.
    #[serde(default)]
    pub expired: bool,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket last granted something.
    pub last_used_at: DateTime<Utc>,
    /// How many grants this session has made.
    pub use_count: u32,
}

impl TicketGrantingTicket {
    /// Logical kind: proxy-granting when chained under a parent.
    pub fn kind(&self) -> TicketKind {
        if self.parent_id.is_some() {
            TicketKind::ProxyGranting
        } else {
            TicketKind::TicketGranting
        }
    }

    /// Whether this is a session root (not a delegated granting ticket).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Revoke the session. Irreversible.
    pub fn mark_expired(&mut self) {
        self.expired = true;
    }

    /// Record a grant: advances use count and the idle window.
    pub fn record_use(&mut self, now: DateTime<Utc>) {
        self.use_count += 1;
        self.last_used_at = now;
    }

    /// Usage snapshot for policy evaluation.
    pub fn activity(&self) -> TicketActivity {
        TicketActivity {
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            use_count: self.use_count,
        }
    }

    /// Whether the session is dead, by revocation or by policy.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired || self.expiration_policy.is_expired(&self.activity(), now)
    }
}

/// Single-service access grant backed by exactly one granting ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTicket {
    /// Ticket identifier (`ST-` prefixed).
    pub id: TicketId,
    /// Service this grant is scoped to.
    pub service: ServiceRef,
    /// The granting ticket that issued this grant.
    pub granting_ticket_id: TicketId,
    /// Whether the grant came from fresh credential presentation rather
    /// than an existing SSO session.
    pub from_new_login: bool,
    /// Expiration policy bound at creation.
    pub expiration_policy: ExpirationPolicy,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last validated.
    pub last_used_at: DateTime<Utc>,
    /// How many times the ticket has been validated.
    pub use_count: u32,
}

impl ServiceTicket {
    /// Record a validation: advances use count and last-used time.
    pub fn record_use(&mut self, now: DateTime<Utc>) {
        self.use_count += 1;
        self.last_used_at = now;
    }

    /// Usage snapshot for policy evaluation.
    pub fn activity(&self) -> TicketActivity {
        TicketActivity {
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            use_count: self.use_count,
        }
    }

    /// Whether the grant itself is expired. Validity against the backing
    /// session (its granting ticket still existing) is a registry-level
    /// question and is checked at validation time, not here.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_policy.is_expired(&self.activity(), now)
    }
}

/// Access grant issued to a service acting as a proxy for another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTicket {
    /// Ticket identifier (`PT-` prefixed).
    pub id: TicketId,
    /// Target service the proxy is calling on the user's behalf.
    pub service: ServiceRef,
    /// The proxy-granting ticket that issued this grant.
    pub granting_ticket_id: TicketId,
    /// Expiration policy bound at creation.
    pub expiration_policy: ExpirationPolicy,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last validated.
    pub last_used_at: DateTime<Utc>,
    /// How many times the ticket has been validated.
    pub use_count: u32,
}

impl ProxyTicket {
    /// Record a validation: advances use count and last-used time.
    pub fn record_use(&mut self, now: DateTime<Utc>) {
        self.use_count += 1;
        self.last_used_at = now;
    }

    /// Usage snapshot for policy evaluation.
    pub fn activity(&self) -> TicketActivity {
        TicketActivity {
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            use_count: self.use_count,
        }
    }

    /// Whether the grant is expired under its own policy.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_policy.is_expired(&self.activity(), now)
    }
}

/// Opaque storage carrier produced by the encrypting registry decorator.
///
/// `id` is the one-way hash of the logical id; `payload` is the encrypted
/// serialized ticket. Carries no ticket behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedTicket {
    /// Hashed storage identifier.
    pub id: TicketId,
    /// Encrypted serialized ticket bytes.
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

/// The closed ticket set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ticket {
    /// Session root or delegated proxy-granting ticket.
    TicketGranting(TicketGrantingTicket),
    /// Per-service grant.
    Service(ServiceTicket),
    /// Per-service grant issued through a proxy chain.
    Proxy(ProxyTicket),
    /// Encrypted storage carrier; never observed by registry consumers
    /// when the encrypting decorator is on the read path.
    Encoded(EncodedTicket),
}

impl Ticket {
    /// The ticket's identifier (the hashed one for encoded carriers).
    pub fn id(&self) -> &TicketId {
        match self {
            Self::TicketGranting(tgt) => &tgt.id,
            Self::Service(st) => &st.id,
            Self::Proxy(pt) => &pt.id,
            Self::Encoded(enc) => &enc.id,
        }
    }

    /// Logical kind; encoded carriers have none.
    pub fn kind(&self) -> Option<TicketKind> {
        match self {
            Self::TicketGranting(tgt) => Some(tgt.kind()),
            Self::Service(_) => Some(TicketKind::Service),
            Self::Proxy(_) => Some(TicketKind::Proxy),
            Self::Encoded(_) => None,
        }
    }

    /// The granting (parent) ticket id, where one exists.
    pub fn parent_id(&self) -> Option<&TicketId> {
        match self {
            Self::TicketGranting(tgt) => tgt.parent_id.as_ref(),
            Self::Service(st) => Some(&st.granting_ticket_id),
            Self::Proxy(pt) => Some(&pt.granting_ticket_id),
            Self::Encoded(_) => None,
        }
    }

    /// Policy expiry at `now`. Encoded carriers cannot be evaluated and
    /// report not-expired; the cleanup pass warns when it meets one.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::TicketGranting(tgt) => tgt.is_expired(now),
            Self::Service(st) => st.is_expired(now),
            Self::Proxy(pt) => pt.is_expired(now),
            Self::Encoded(_) => false,
        }
    }

    /// Record a use on the underlying ticket. No-op for encoded carriers.
    pub fn record_use(&mut self, now: DateTime<Utc>) {
        match self {
            Self::TicketGranting(tgt) => tgt.record_use(now),
            Self::Service(st) => st.record_use(now),
            Self::Proxy(pt) => pt.record_use(now),
            Self::Encoded(_) => {}
        }
    }
}

mod base64_bytes {
    //! Serde adapter storing binary payloads as base64 strings.

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

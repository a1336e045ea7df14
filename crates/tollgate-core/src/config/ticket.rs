//! Ticket policy and id generation configuration.

use serde::{Deserialize, Serialize};

/// Ticket lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Host suffix appended to generated ticket identifiers so ids from
    /// different cluster nodes cannot collide.
    #[serde(default = "default_host")]
    pub host: String,
    /// Length of the random alphanumeric tail in generated identifiers.
    #[serde(default = "default_tail_length")]
    pub tail_length: usize,
    /// Policy bounds for ticket-granting tickets.
    #[serde(default)]
    pub tgt: GrantingTicketPolicyConfig,
    /// Policy bounds for service tickets.
    #[serde(default)]
    pub st: ServiceTicketPolicyConfig,
    /// Policy bounds for proxy-granting tickets.
    #[serde(default)]
    pub pgt: GrantingTicketPolicyConfig,
    /// Policy bounds for proxy tickets.
    #[serde(default)]
    pub pt: ServiceTicketPolicyConfig,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            tail_length: default_tail_length(),
            tgt: GrantingTicketPolicyConfig::default(),
            st: ServiceTicketPolicyConfig::default(),
            pgt: GrantingTicketPolicyConfig::default(),
            pt: ServiceTicketPolicyConfig::default(),
        }
    }
}

/// Two-bound session policy: idle window and absolute lifetime.
/// Either bound expires the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantingTicketPolicyConfig {
    /// Seconds of inactivity after which the session expires.
    #[serde(default = "default_tgt_idle")]
    pub idle_seconds: u64,
    /// Maximum session lifetime in seconds regardless of activity.
    #[serde(default = "default_tgt_lifetime")]
    pub max_lifetime_seconds: u64,
}

impl Default for GrantingTicketPolicyConfig {
    fn default() -> Self {
        Self {
            idle_seconds: default_tgt_idle(),
            max_lifetime_seconds: default_tgt_lifetime(),
        }
    }
}

/// Use-count-or-timeout policy for service and proxy tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTicketPolicyConfig {
    /// Number of validations after which the ticket is spent.
    #[serde(default = "default_st_uses")]
    pub max_uses: u32,
    /// Seconds after creation at which the ticket expires unused.
    #[serde(default = "default_st_ttl")]
    pub ttl_seconds: u64,
}

impl Default for ServiceTicketPolicyConfig {
    fn default() -> Self {
        Self {
            max_uses: default_st_uses(),
            ttl_seconds: default_st_ttl(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_tail_length() -> usize {
    10
}

fn default_tgt_idle() -> u64 {
    7200
}

fn default_tgt_lifetime() -> u64 {
    28800
}

fn default_st_uses() -> u32 {
    1
}

fn default_st_ttl() -> u64 {
    10
}

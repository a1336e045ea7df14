//! Single logout configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Single logout orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutConfig {
    /// Disables logout dispatch entirely. Session destruction still
    /// cascades ticket deletion; services are simply not notified.
    #[serde(default)]
    pub disabled: bool,
    /// Whether services are notified before or after the tickets of the
    /// destroyed session are removed from the registry.
    #[serde(default)]
    pub dispatch_order: DispatchOrder,
    /// Maximum number of destinations notified concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-destination delivery timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Per-service logout URL overrides. Key is the service id, value the
    /// URL that receives the back-channel logout message instead of the
    /// service's own URL.
    #[serde(default)]
    pub logout_urls: HashMap<String, String>,
    /// Services notified by front-channel redirect on their next contact
    /// instead of a direct back-channel call.
    #[serde(default)]
    pub front_channel_services: Vec<String>,
}

impl Default for LogoutConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            dispatch_order: DispatchOrder::default(),
            concurrency: default_concurrency(),
            timeout_seconds: default_timeout(),
            logout_urls: HashMap::new(),
            front_channel_services: Vec::new(),
        }
    }
}

/// Ordering of logout dispatch relative to ticket removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOrder {
    /// Notify services first, then delete the session's tickets. Messages
    /// built this way can still reference live service tickets.
    NotifyThenDelete,
    /// Delete the session's tickets first, then notify services.
    DeleteThenNotify,
}

impl Default for DispatchOrder {
    fn default() -> Self {
        Self::NotifyThenDelete
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    5
}

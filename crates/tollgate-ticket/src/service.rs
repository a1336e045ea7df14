//! Relying-service reference.

use serde::{Deserialize, Serialize};

/// A service that tickets are granted to.
///
/// Carried inside service tickets and inside the granting ticket's service
/// map so single logout can find every service the session visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Registered service identifier.
    pub id: String,
    /// The URL the client presented when requesting access.
    pub original_url: String,
}

impl ServiceRef {
    /// Create a service reference.
    pub fn new(id: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_url: original_url.into(),
        }
    }
}

//! Authentication snapshot carried by granting tickets.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of a successful authentication.
///
/// Captured once at login and carried by the session's granting ticket;
/// validation assertions hand it back to relying services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
    /// Authenticated principal identifier.
    pub principal: String,
    /// Released principal attributes.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    /// When the authentication happened.
    pub authenticated_at: DateTime<Utc>,
}

impl Authentication {
    /// Create an authentication record for a principal, stamped now.
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            attributes: HashMap::new(),
            authenticated_at: Utc::now(),
        }
    }

    /// Attach an attribute, builder style.
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

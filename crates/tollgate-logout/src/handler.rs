//! Logout message delivery.
//!
//! Handlers form an ordered chain; the first one whose `supports` accepts a
//! request delivers it. Back-channel delivery calls the destination
//! directly, front-channel delivery stages a redirect for the service's
//! next contact.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use tollgate_core::config::logout::LogoutConfig;

use crate::request::{LogoutChannel, LogoutRequest, LogoutRequestStatus};

/// One member of the ordered logout dispatch chain.
#[async_trait]
pub trait LogoutMessageHandler: Send + Sync + fmt::Debug + 'static {
    /// Chain position; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Whether this handler delivers the given request.
    fn supports(&self, request: &LogoutRequest) -> bool;

    /// Deliver or stage the message. Delivery failure is a status, not an
    /// error; nothing propagates past the fan-out.
    async fn handle(&self, request: &LogoutRequest, message: &str) -> LogoutRequestStatus;
}

/// Direct server-to-server delivery with a per-destination timeout.
#[derive(Debug, Clone)]
pub struct BackChannelLogoutHandler {
    http: reqwest::Client,
    timeout: Duration,
}

impl BackChannelLogoutHandler {
    /// Build the handler from logout configuration.
    pub fn from_config(config: &LogoutConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl LogoutMessageHandler for BackChannelLogoutHandler {
    fn supports(&self, request: &LogoutRequest) -> bool {
        request.channel == LogoutChannel::BackChannel && request.url.is_some()
    }

    async fn handle(&self, request: &LogoutRequest, message: &str) -> LogoutRequestStatus {
        let Some(url) = request.url.as_deref() else {
            return LogoutRequestStatus::Failure;
        };

        let send = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(message.to_string())
            .send();

        match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) if response.status().is_success() => {
                debug!(url, service_id = %request.service.id, "Delivered logout message");
                LogoutRequestStatus::Success
            }
            Ok(Ok(response)) => {
                warn!(
                    url,
                    status = %response.status(),
                    "Logout destination answered with an error status"
                );
                LogoutRequestStatus::Failure
            }
            Ok(Err(e)) => {
                warn!(url, error = %e, "Failed to deliver logout message");
                LogoutRequestStatus::Failure
            }
            Err(_) => {
                warn!(
                    url,
                    timeout_seconds = self.timeout.as_secs(),
                    "Logout delivery timed out"
                );
                LogoutRequestStatus::Failure
            }
        }
    }
}

/// A staged front-channel logout redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogout {
    /// Redirect target at the service.
    pub url: String,
    /// The logout message the redirect carries.
    pub message: String,
}

/// Stages logout redirects served on the service's next contact.
///
/// Nothing leaves the server at dispatch time; the web tier drains staged
/// entries by service id when the user agent next shows up. Staged
/// requests stay [`LogoutRequestStatus::NotAttempted`].
#[derive(Debug, Default)]
pub struct FrontChannelLogoutHandler {
    pending: DashMap<String, Vec<PendingLogout>>,
}

impl FrontChannelLogoutHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every staged redirect for a service.
    pub fn drain(&self, service_id: &str) -> Vec<PendingLogout> {
        self.pending
            .remove(service_id)
            .map(|(_, staged)| staged)
            .unwrap_or_default()
    }

    /// Number of services with staged redirects.
    pub fn pending_services(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl LogoutMessageHandler for FrontChannelLogoutHandler {
    fn supports(&self, request: &LogoutRequest) -> bool {
        request.channel == LogoutChannel::FrontChannel && request.url.is_some()
    }

    async fn handle(&self, request: &LogoutRequest, message: &str) -> LogoutRequestStatus {
        let Some(url) = request.url.clone() else {
            return LogoutRequestStatus::Failure;
        };

        self.pending
            .entry(request.service.id.clone())
            .or_default()
            .push(PendingLogout {
                url,
                message: message.to_string(),
            });
        debug!(service_id = %request.service.id, "Staged front-channel logout redirect");
        LogoutRequestStatus::NotAttempted
    }
}

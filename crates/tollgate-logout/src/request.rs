//! Per-destination logout records.
//!
//! A [`LogoutRequest`] is created transiently while a session is being
//! destroyed and never persisted; it exists to carry resolution and
//! delivery state through the fan-out and into the aggregate log line.

use tollgate_ticket::{ServiceRef, TicketId};

/// How a logout notice reaches the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutChannel {
    /// Direct server-to-server call at logout time.
    BackChannel,
    /// Redirect served to the user agent on the service's next contact.
    FrontChannel,
}

/// Delivery status of one logout notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutRequestStatus {
    /// Not yet dispatched, or staged for front-channel delivery.
    NotAttempted,
    /// The destination acknowledged the notice.
    Success,
    /// Resolution, building, or delivery failed.
    Failure,
}

/// Resolved logout target for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutDestination {
    /// Absolute URL that receives the notice.
    pub url: String,
    /// Delivery channel.
    pub channel: LogoutChannel,
}

impl LogoutDestination {
    /// Back-channel destination.
    pub fn back_channel(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: LogoutChannel::BackChannel,
        }
    }

    /// Front-channel destination.
    pub fn front_channel(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: LogoutChannel::FrontChannel,
        }
    }
}

/// One service's logout notice and its delivery state.
#[derive(Debug, Clone)]
pub struct LogoutRequest {
    /// The service ticket the session issued to this service.
    pub ticket_id: TicketId,
    /// The service being notified.
    pub service: ServiceRef,
    /// Resolved logout URL; `None` when resolution failed.
    pub url: Option<String>,
    /// Delivery channel.
    pub channel: LogoutChannel,
    /// Current delivery status.
    pub status: LogoutRequestStatus,
}

impl LogoutRequest {
    /// A resolved, not-yet-dispatched request.
    pub fn new(ticket_id: TicketId, service: ServiceRef, destination: LogoutDestination) -> Self {
        Self {
            ticket_id,
            service,
            url: Some(destination.url),
            channel: destination.channel,
            status: LogoutRequestStatus::NotAttempted,
        }
    }

    /// A request whose URL resolution already failed. Carries the failure
    /// into the aggregate without ever being dispatched.
    pub fn failed(ticket_id: TicketId, service: ServiceRef) -> Self {
        Self {
            ticket_id,
            service,
            url: None,
            channel: LogoutChannel::BackChannel,
            status: LogoutRequestStatus::Failure,
        }
    }
}

//! # tollgate-logout
//!
//! Single logout orchestration: when an SSO session ends, every service the
//! session issued a ticket to is notified that the session is gone.
//!
//! The fan-out per destroyed session runs through four stages:
//! 1. Resolve a logout URL per visited service through an ordered
//!    [`LogoutUrlResolver`] chain (first supporting resolver wins)
//! 2. Build the logout message with a [`LogoutMessageBuilder`]
//! 3. Dispatch through the first supporting [`LogoutMessageHandler`],
//!    destinations in parallel under a bounded concurrency limit
//! 4. Aggregate per-destination statuses and log them
//!
//! Delivery is best effort. A failed or timed-out destination is recorded
//! and never blocks or reverses session destruction.

pub mod handler;
pub mod manager;
pub mod message;
pub mod request;
pub mod slo;
pub mod url;

pub use handler::{BackChannelLogoutHandler, FrontChannelLogoutHandler, LogoutMessageHandler};
pub use manager::{DefaultLogoutManager, LogoutManager};
pub use message::{DefaultLogoutMessageBuilder, LogoutMessageBuilder};
pub use request::{LogoutChannel, LogoutDestination, LogoutRequest, LogoutRequestStatus};
pub use slo::SingleLogoutTicketRegistry;
pub use url::{DefaultLogoutUrlResolver, LogoutUrlResolver, StaticLogoutUrlResolver};

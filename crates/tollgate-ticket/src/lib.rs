//! # tollgate-ticket
//!
//! Ticket model for the Tollgate single-sign-on authority:
//! - Typed ticket identifiers with kind prefixes and a cluster-safe generator
//! - The closed set of ticket kinds (granting, proxy-granting, service, proxy)
//! - Expiration policies evaluated purely from ticket state and "now"
//! - The ticket factory that binds configured policies at creation time

pub mod authentication;
pub mod expiry;
pub mod factory;
pub mod id;
pub mod service;
pub mod ticket;

pub use authentication::Authentication;
pub use expiry::{ExpirationPolicy, TicketActivity};
pub use factory::TicketFactory;
pub use id::{TicketId, TicketIdGenerator, TicketKind};
pub use service::ServiceRef;
pub use ticket::{EncodedTicket, ProxyTicket, ServiceTicket, Ticket, TicketGrantingTicket};

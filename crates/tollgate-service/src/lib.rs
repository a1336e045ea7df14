//! # tollgate-service
//!
//! The authority facade over the ticket stack: session creation, service
//! ticket grants and validation, proxy delegation, and session destruction.
//! Operations read and write through whatever registry stack they are
//! handed, so single logout and encryption-at-rest follow the deployment's
//! wiring rather than anything decided here.

pub mod assertion;
pub mod authority;

pub use assertion::ValidationAssertion;
pub use authority::TicketAuthority;

//! Redis-backed ticket registry.

mod client;
mod store;

pub use client::RedisClient;
pub use store::RedisTicketRegistry;

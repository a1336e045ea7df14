//! # tollgate-core
//!
//! Core crate for the Tollgate single-sign-on ticketing authority.
//! Contains configuration schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other Tollgate crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;

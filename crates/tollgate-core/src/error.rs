//! Unified application error types for Tollgate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested ticket was not found or was rejected by a predicate.
    /// Callers cannot distinguish the two cases.
    TicketNotFound,
    /// The ticket exists but is expired. Surfaces only where expiry itself
    /// is the outcome (granting against a dead session); lookup paths
    /// report [`ErrorKind::TicketNotFound`] instead.
    TicketExpired,
    /// Encryption, decryption, or signature verification failed.
    Cipher,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The ticket registry backend failed or is unavailable.
    Registry,
    /// The cluster lock could not be acquired within its lease semantics.
    LockUnavailable,
    /// A conflict occurred (duplicate ticket identifier).
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicketNotFound => write!(f, "TICKET_NOT_FOUND"),
            Self::TicketExpired => write!(f, "TICKET_EXPIRED"),
            Self::Cipher => write!(f, "CIPHER"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Registry => write!(f, "REGISTRY"),
            Self::LockUnavailable => write!(f, "LOCK_UNAVAILABLE"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Tollgate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a ticket-not-found error.
    pub fn ticket_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TicketNotFound, message)
    }

    /// Create a ticket-expired error.
    pub fn ticket_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TicketExpired, message)
    }

    /// Create a cipher error.
    pub fn cipher(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cipher, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    /// Create a registry backend error.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Registry, message)
    }

    /// Create a lock-unavailable error.
    pub fn lock_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockUnavailable, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

//! The outcome handed to a service after successful ticket validation.

use serde::{Deserialize, Serialize};

use tollgate_ticket::{Authentication, ServiceRef};

/// What a service learns when it validates a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationAssertion {
    /// The authentication established when the session was opened.
    pub authentication: Authentication,
    /// The service the ticket was granted for.
    pub service: ServiceRef,
    /// Whether the grant came from fresh credentials rather than an
    /// existing single-sign-on session. Always `false` for proxy tickets.
    pub from_new_login: bool,
}

//! Logout message construction.

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use tollgate_core::result::AppResult;

use crate::request::LogoutRequest;

/// Builds the logout payload delivered to one destination.
pub trait LogoutMessageBuilder: Send + Sync + fmt::Debug + 'static {
    /// Produce the message body for one request.
    fn build(&self, request: &LogoutRequest) -> AppResult<String>;
}

/// JSON session-termination notice.
///
/// Carries a unique message id, the issue instant, and the service ticket
/// the destination originally received, so it can tear down the matching
/// local session.
#[derive(Debug, Default)]
pub struct DefaultLogoutMessageBuilder;

impl LogoutMessageBuilder for DefaultLogoutMessageBuilder {
    fn build(&self, request: &LogoutRequest) -> AppResult<String> {
        let message = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "issued_at": Utc::now().to_rfc3339(),
            "session_ticket": request.ticket_id.as_str(),
            "service": request.service.id,
        });
        Ok(serde_json::to_string(&message)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_ticket::{ServiceRef, TicketId};

    use crate::request::LogoutDestination;

    fn request() -> LogoutRequest {
        LogoutRequest::new(
            TicketId::new("ST-1-abc-localhost"),
            ServiceRef::new("app", "https://app.example.org/"),
            LogoutDestination::back_channel("https://app.example.org/logout"),
        )
    }

    #[test]
    fn test_message_names_ticket_and_service() {
        let message = DefaultLogoutMessageBuilder.build(&request()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&message).unwrap();

        assert_eq!(parsed["session_ticket"], "ST-1-abc-localhost");
        assert_eq!(parsed["service"], "app");
        assert!(parsed["id"].is_string());
        assert!(parsed["issued_at"].is_string());
    }

    #[test]
    fn test_fresh_id_per_message() {
        let builder = DefaultLogoutMessageBuilder;
        let first: serde_json::Value =
            serde_json::from_str(&builder.build(&request()).unwrap()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&builder.build(&request()).unwrap()).unwrap();
        assert_ne!(first["id"], second["id"]);
    }
}

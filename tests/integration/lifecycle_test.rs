//! Integration tests for the ticket lifecycle with single logout.

use tollgate_core::config::logout::LogoutConfig;
use tollgate_registry::TicketRegistry;

use crate::helpers::{self, TestStack};

#[tokio::test]
async fn test_login_grant_validate_destroy() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("alice"))
        .await
        .unwrap();
    let st_id = stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    let assertion = stack
        .authority
        .validate_service_ticket(&st_id, &helpers::service("svc-1"))
        .await
        .unwrap();
    assert_eq!(assertion.authentication.principal, "alice");
    assert_eq!(assertion.service.id, "svc-1");
    assert!(assertion.from_new_login);

    // Validation consumed the single-use grant; the session stays up.
    assert!(stack.backend.fetch_ticket(&st_id).await.unwrap().is_none());
    assert!(stack.backend.fetch_ticket(&tgt_id).await.unwrap().is_some());

    let removed = stack
        .authority
        .destroy_ticket_granting_ticket(&tgt_id)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(stack.backend.get_tickets().await.unwrap().is_empty());

    // The spent grant still names its service in the logout notice.
    let deliveries = stack.logout.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "svc-1");
    let message: serde_json::Value = serde_json::from_str(&deliveries[0].1).unwrap();
    assert_eq!(message["session_ticket"], st_id.as_str());
}

#[tokio::test]
async fn test_destroy_counts_session_and_grants() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("bob"))
        .await
        .unwrap();
    stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    let removed = stack
        .authority
        .destroy_ticket_granting_ticket(&tgt_id)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    assert!(stack.backend.get_tickets().await.unwrap().is_empty());
    assert_eq!(stack.logout.notified_services(), vec!["svc-1"]);
}

#[tokio::test]
async fn test_proxy_chain_destroyed_from_the_root() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("carol"))
        .await
        .unwrap();
    let st_id = stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();
    let pgt_id = stack
        .authority
        .delegate_proxy_granting_ticket(&st_id, helpers::login("svc-1-proxy"))
        .await
        .unwrap();
    stack
        .authority
        .grant_proxy_ticket(&pgt_id, helpers::service("svc-2"))
        .await
        .unwrap();

    let removed = stack
        .authority
        .destroy_ticket_granting_ticket(&tgt_id)
        .await
        .unwrap();

    // Session, service ticket, delegate, proxy ticket.
    assert_eq!(removed, 4);
    assert!(stack.backend.get_tickets().await.unwrap().is_empty());

    // Only the destroyed root's own services are notified; the chained
    // delegate goes down inside the cascade without its own fan-out.
    assert_eq!(stack.logout.notified_services(), vec!["svc-1"]);
}

#[tokio::test]
async fn test_disabled_logout_still_destroys() {
    let config = LogoutConfig {
        disabled: true,
        ..LogoutConfig::default()
    };
    let stack = TestStack::with_logout_config(config);

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("dave"))
        .await
        .unwrap();
    stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    let removed = stack
        .authority
        .destroy_ticket_granting_ticket(&tgt_id)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    assert!(stack.logout.deliveries().is_empty());
}

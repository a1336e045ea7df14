//! Integration tests for scheduled cleanup over the logout-decorated stack.

use std::sync::Arc;

use chrono::Duration;

use tollgate_cleaner::{ClusterLock, MemoryClusterLock, TicketCleaner};
use tollgate_core::config::cleaner::CleanerConfig;
use tollgate_registry::TicketRegistry;
use tollgate_ticket::{Ticket, TicketId};

use crate::helpers::{self, TestStack};

fn cleaner_for(stack: &TestStack) -> TicketCleaner {
    TicketCleaner::new(
        stack.registry.clone(),
        Arc::new(MemoryClusterLock::new()),
        &CleanerConfig::default(),
    )
}

/// Push a session's timestamps into the past, straight through the backend.
async fn backdate_session(stack: &TestStack, tgt_id: &TicketId, hours: i64) {
    let Some(Ticket::TicketGranting(mut session)) =
        stack.backend.fetch_ticket(tgt_id).await.unwrap()
    else {
        panic!("session {tgt_id} not found");
    };
    session.created_at -= Duration::hours(hours);
    session.last_used_at -= Duration::hours(hours);
    stack
        .backend
        .update_ticket(Ticket::TicketGranting(session))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_session_swept_with_logout() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("alice"))
        .await
        .unwrap();
    stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();
    stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-2"), false)
        .await
        .unwrap();

    // Three hours idle, past the two hour sliding window.
    backdate_session(&stack, &tgt_id, 3).await;

    let outcome = cleaner_for(&stack).clean().await.unwrap();

    assert!(outcome.executed);
    assert_eq!(outcome.expired, 1);
    assert_eq!(outcome.removed, 3);
    assert_eq!(outcome.failures, 0);
    assert!(stack.backend.get_tickets().await.unwrap().is_empty());

    // One notice per service the expired session had granted to.
    assert_eq!(stack.logout.notified_services(), vec!["svc-1", "svc-2"]);
}

#[tokio::test]
async fn test_expired_grant_swept_without_logout() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("bob"))
        .await
        .unwrap();
    let st_id = stack
        .authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    // Age the grant past its time-to-live without touching the session.
    let Some(Ticket::Service(mut grant)) = stack.backend.fetch_ticket(&st_id).await.unwrap()
    else {
        panic!("grant {st_id} not found");
    };
    grant.created_at -= Duration::minutes(5);
    stack
        .backend
        .update_ticket(Ticket::Service(grant))
        .await
        .unwrap();

    let outcome = cleaner_for(&stack).clean().await.unwrap();

    assert!(outcome.executed);
    assert_eq!(outcome.expired, 1);
    assert_eq!(outcome.removed, 1);
    assert!(stack.backend.fetch_ticket(&st_id).await.unwrap().is_none());
    assert!(stack.backend.fetch_ticket(&tgt_id).await.unwrap().is_some());

    // Expired grants are dropped quietly; only session death notifies.
    assert!(stack.logout.deliveries().is_empty());
}

#[tokio::test]
async fn test_clean_pass_skipped_under_contention() {
    let stack = TestStack::new();

    let tgt_id = stack
        .authority
        .create_ticket_granting_ticket(helpers::login("carol"))
        .await
        .unwrap();
    backdate_session(&stack, &tgt_id, 3).await;

    let lock = MemoryClusterLock::new();
    let holder = lock.sibling();
    assert!(holder.acquire(std::time::Duration::from_secs(60)).await.unwrap());

    let cleaner = TicketCleaner::new(
        stack.registry.clone(),
        Arc::new(lock),
        &CleanerConfig::default(),
    );
    let outcome = cleaner.clean().await.unwrap();

    assert!(!outcome.executed);
    assert!(stack.backend.fetch_ticket(&tgt_id).await.unwrap().is_some());
    assert!(stack.logout.deliveries().is_empty());
}

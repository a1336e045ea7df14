//! Integration tests for the encrypted registry stack.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use tollgate_core::config::registry::{CipherOrder, CryptoConfig, RegistryConfig};
use tollgate_core::config::ticket::TicketConfig;
use tollgate_registry::{
    AesGcmTicketCipher, EncryptedTicketRegistry, InMemoryTicketRegistry, RegistryManager,
    TicketRegistry,
};
use tollgate_service::TicketAuthority;
use tollgate_ticket::{Ticket, TicketFactory};

use crate::helpers;

fn crypto_config(order: CipherOrder) -> CryptoConfig {
    CryptoConfig {
        enabled: true,
        encryption_key: STANDARD.encode([7u8; 32]),
        signing_key: STANDARD.encode(b"integration-signing-key"),
        order,
    }
}

fn authority_over(registry: Arc<dyn TicketRegistry>) -> TicketAuthority {
    TicketAuthority::new(TicketFactory::new(TicketConfig::default()), registry)
}

#[tokio::test]
async fn test_lifecycle_through_an_encrypted_registry() {
    let config = RegistryConfig {
        crypto: crypto_config(CipherOrder::EncryptThenSign),
        ..RegistryConfig::default()
    };
    let manager = RegistryManager::new(&config).await.unwrap();
    let authority = authority_over(manager.shared());

    let tgt_id = authority
        .create_ticket_granting_ticket(helpers::login("alice"))
        .await
        .unwrap();
    let st_id = authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    let assertion = authority
        .validate_service_ticket(&st_id, &helpers::service("svc-1"))
        .await
        .unwrap();
    assert_eq!(assertion.authentication.principal, "alice");

    // A second, live grant makes the destroy cascade observable.
    let second = authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-2"), false)
        .await
        .unwrap();
    assert!(manager.registry().fetch_ticket(&second).await.unwrap().is_some());

    let removed = authority
        .destroy_ticket_granting_ticket(&tgt_id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(manager.registry().get_tickets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_stores_only_opaque_carriers() {
    let backend = Arc::new(InMemoryTicketRegistry::new());
    let cipher =
        Arc::new(AesGcmTicketCipher::from_config(&crypto_config(CipherOrder::EncryptThenSign)).unwrap());
    let registry: Arc<dyn TicketRegistry> =
        Arc::new(EncryptedTicketRegistry::new(backend.clone(), cipher));
    let authority = authority_over(registry.clone());

    let tgt_id = authority
        .create_ticket_granting_ticket(helpers::login("alice"))
        .await
        .unwrap();
    let st_id = authority
        .grant_service_ticket(&tgt_id, helpers::service("svc-1"), true)
        .await
        .unwrap();

    let stored = backend.get_tickets().await.unwrap();
    assert_eq!(stored.len(), 2);
    for ticket in &stored {
        let Ticket::Encoded(carrier) = ticket else {
            panic!("backend holds a plaintext ticket: {ticket:?}");
        };
        // Hashed storage key, never the issued identifier.
        assert_ne!(carrier.id, tgt_id);
        assert_ne!(carrier.id, st_id);
        // The payload is ciphertext; the principal must not show through.
        let needle = b"alice";
        assert!(
            !carrier
                .payload
                .windows(needle.len())
                .any(|window| window == needle),
            "payload leaks the principal"
        );
    }

    // Logical reads still return the real tickets.
    let fetched = registry.fetch_ticket(&tgt_id).await.unwrap();
    assert!(matches!(fetched, Some(Ticket::TicketGranting(_))));
}

#[tokio::test]
async fn test_sign_then_encrypt_order_round_trips() {
    let config = RegistryConfig {
        crypto: crypto_config(CipherOrder::SignThenEncrypt),
        ..RegistryConfig::default()
    };
    let manager = RegistryManager::new(&config).await.unwrap();
    let authority = authority_over(manager.shared());

    let tgt_id = authority
        .create_ticket_granting_ticket(helpers::login("bob"))
        .await
        .unwrap();
    let fetched = manager.registry().fetch_ticket(&tgt_id).await.unwrap();
    assert!(matches!(fetched, Some(Ticket::TicketGranting(_))));
}

//! At-rest ticket payload cipher.
//!
//! Serialized tickets are encrypted with AES-256-GCM and authenticated with
//! HMAC-SHA256 before they reach a storage backend. Both keys arrive as
//! base64 in [`CryptoConfig`]; the configured [`CipherOrder`] decides whether
//! the signature covers the ciphertext or the plaintext.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use tollgate_core::config::registry::{CipherOrder, CryptoConfig};
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Nonce for AES-GCM is 96 bits (12 bytes), prepended to every ciphertext.
const NONCE_LENGTH: usize = 12;

/// HMAC-SHA256 output appended to (or enclosed in) every payload.
const SIGNATURE_LENGTH: usize = 32;

/// Symmetric cipher applied to serialized tickets at the storage boundary.
pub trait TicketCipher: Send + Sync + fmt::Debug + 'static {
    /// Encrypt and sign a serialized ticket.
    fn encode(&self, plaintext: &[u8]) -> AppResult<Vec<u8>>;

    /// Verify and decrypt a stored payload back to the serialized ticket.
    ///
    /// Any tampering, truncation, or key mismatch fails with a
    /// `Cipher`-kind error; callers must treat the payload as lost.
    fn decode(&self, payload: &[u8]) -> AppResult<Vec<u8>>;
}

/// AES-256-GCM + HMAC-SHA256 ticket cipher.
pub struct AesGcmTicketCipher {
    cipher: Aes256Gcm,
    signing_key: Vec<u8>,
    order: CipherOrder,
}

impl AesGcmTicketCipher {
    /// Build a cipher from crypto configuration.
    ///
    /// The encryption key must decode to exactly 32 bytes; the signing key
    /// to any non-empty byte string.
    pub fn from_config(config: &CryptoConfig) -> AppResult<Self> {
        let encryption_key = STANDARD.decode(&config.encryption_key).map_err(|e| {
            AppError::configuration(format!("Encryption key is not valid base64: {e}"))
        })?;
        if encryption_key.len() != 32 {
            return Err(AppError::configuration(format!(
                "Encryption key must be exactly 32 bytes for AES-256-GCM, got {}",
                encryption_key.len()
            )));
        }

        let signing_key = STANDARD
            .decode(&config.signing_key)
            .map_err(|e| AppError::configuration(format!("Signing key is not valid base64: {e}")))?;
        if signing_key.is_empty() {
            return Err(AppError::configuration("Signing key must not be empty"));
        }

        let cipher = Aes256Gcm::new_from_slice(&encryption_key).map_err(|e| {
            AppError::configuration(format!("Failed to initialize AES-256-GCM cipher: {e}"))
        })?;

        Ok(Self {
            cipher,
            signing_key,
            order: config.order,
        })
    }

    fn encrypt(&self, plaintext: &[u8]) -> AppResult<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| AppError::cipher(format!("Encryption failed: {e}")))?;

        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ciphertext);
        Ok(payload)
    }

    fn decrypt(&self, payload: &[u8]) -> AppResult<Vec<u8>> {
        if payload.len() < NONCE_LENGTH {
            return Err(AppError::cipher("Payload shorter than the AES-GCM nonce"));
        }
        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LENGTH);
        let nonce = Nonce::clone_from_slice(nonce_bytes);

        self.cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|e| AppError::cipher(format!("Decryption failed: {e}")))
    }

    fn sign(&self, data: &[u8]) -> AppResult<Vec<u8>> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.signing_key)
            .map_err(|e| AppError::cipher(format!("Signing key rejected: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Constant-time signature check.
    fn verify(&self, data: &[u8], signature: &[u8]) -> AppResult<()> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.signing_key)
            .map_err(|e| AppError::cipher(format!("Signing key rejected: {e}")))?;
        mac.update(data);
        mac.verify_slice(signature)
            .map_err(|_| AppError::cipher("Payload signature verification failed"))
    }
}

impl TicketCipher for AesGcmTicketCipher {
    fn encode(&self, plaintext: &[u8]) -> AppResult<Vec<u8>> {
        match self.order {
            CipherOrder::EncryptThenSign => {
                let mut payload = self.encrypt(plaintext)?;
                let signature = self.sign(&payload)?;
                payload.extend_from_slice(&signature);
                Ok(payload)
            }
            CipherOrder::SignThenEncrypt => {
                let signature = self.sign(plaintext)?;
                let mut signed = plaintext.to_vec();
                signed.extend_from_slice(&signature);
                self.encrypt(&signed)
            }
        }
    }

    fn decode(&self, payload: &[u8]) -> AppResult<Vec<u8>> {
        match self.order {
            CipherOrder::EncryptThenSign => {
                if payload.len() < SIGNATURE_LENGTH {
                    return Err(AppError::cipher("Payload shorter than its signature"));
                }
                let (encrypted, signature) = payload.split_at(payload.len() - SIGNATURE_LENGTH);
                self.verify(encrypted, signature)?;
                self.decrypt(encrypted)
            }
            CipherOrder::SignThenEncrypt => {
                let signed = self.decrypt(payload)?;
                if signed.len() < SIGNATURE_LENGTH {
                    return Err(AppError::cipher("Decrypted payload shorter than its signature"));
                }
                let (plaintext, signature) = signed.split_at(signed.len() - SIGNATURE_LENGTH);
                self.verify(plaintext, signature)?;
                Ok(plaintext.to_vec())
            }
        }
    }
}

impl fmt::Debug for AesGcmTicketCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmTicketCipher")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::error::ErrorKind;

    fn config(order: CipherOrder) -> CryptoConfig {
        CryptoConfig {
            enabled: true,
            encryption_key: STANDARD.encode([7u8; 32]),
            signing_key: STANDARD.encode(b"tollgate-signing-key"),
            order,
        }
    }

    #[test]
    fn test_encrypt_then_sign_roundtrip() {
        let cipher = AesGcmTicketCipher::from_config(&config(CipherOrder::EncryptThenSign)).unwrap();
        let payload = cipher.encode(b"ticket body").unwrap();
        assert_ne!(payload.as_slice(), b"ticket body");
        assert_eq!(cipher.decode(&payload).unwrap(), b"ticket body");
    }

    #[test]
    fn test_sign_then_encrypt_roundtrip() {
        let cipher = AesGcmTicketCipher::from_config(&config(CipherOrder::SignThenEncrypt)).unwrap();
        let payload = cipher.encode(b"ticket body").unwrap();
        assert_eq!(cipher.decode(&payload).unwrap(), b"ticket body");
    }

    #[test]
    fn test_tampered_payload_rejected() {
        for order in [CipherOrder::EncryptThenSign, CipherOrder::SignThenEncrypt] {
            let cipher = AesGcmTicketCipher::from_config(&config(order)).unwrap();
            let mut payload = cipher.encode(b"ticket body").unwrap();

            let middle = payload.len() / 2;
            payload[middle] ^= 0xff;

            let err = cipher.decode(&payload).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Cipher);
        }
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let cipher = AesGcmTicketCipher::from_config(&config(CipherOrder::EncryptThenSign)).unwrap();
        let payload = cipher.encode(b"ticket body").unwrap();

        let err = cipher.decode(&payload[..SIGNATURE_LENGTH - 1]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cipher);
    }

    #[test]
    fn test_foreign_signing_key_rejected() {
        let writer = AesGcmTicketCipher::from_config(&config(CipherOrder::EncryptThenSign)).unwrap();
        let mut other = config(CipherOrder::EncryptThenSign);
        other.signing_key = STANDARD.encode(b"some-other-signing-key");
        let reader = AesGcmTicketCipher::from_config(&other).unwrap();

        let payload = writer.encode(b"ticket body").unwrap();
        let err = reader.decode(&payload).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cipher);
    }

    #[test]
    fn test_short_encryption_key_rejected() {
        let mut config = config(CipherOrder::EncryptThenSign);
        config.encryption_key = STANDARD.encode([7u8; 16]);

        let err = AesGcmTicketCipher::from_config(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_base64_key_rejected() {
        let mut config = config(CipherOrder::EncryptThenSign);
        config.encryption_key = "not base64!!!".to_string();

        let err = AesGcmTicketCipher::from_config(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}

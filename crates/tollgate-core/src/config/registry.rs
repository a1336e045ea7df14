//! Ticket registry backend configuration.

use serde::{Deserialize, Serialize};

/// Top-level registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific registry configuration.
    #[serde(default)]
    pub redis: RedisRegistryConfig,
    /// At-rest encryption configuration.
    #[serde(default)]
    pub crypto: CryptoConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisRegistryConfig::default(),
            crypto: CryptoConfig::default(),
        }
    }
}

/// Redis registry backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisRegistryConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Tollgate ticket keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisRegistryConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// At-rest ticket encryption configuration.
///
/// When enabled, storage keys are one-way hashes of the logical ticket id
/// and stored payloads are encrypted and signed. Both keys are base64 of
/// raw key bytes: 32 bytes for encryption, any non-empty length for signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Whether tickets are encrypted before reaching the backend.
    #[serde(default)]
    pub enabled: bool,
    /// Base64-encoded 32-byte AES-256-GCM key.
    #[serde(default)]
    pub encryption_key: String,
    /// Base64-encoded HMAC-SHA256 signing key.
    #[serde(default)]
    pub signing_key: String,
    /// Order in which encryption and signing are applied.
    #[serde(default)]
    pub order: CipherOrder,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            encryption_key: String::new(),
            signing_key: String::new(),
            order: CipherOrder::default(),
        }
    }
}

/// Order of encryption and signing in the ticket cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherOrder {
    /// Encrypt the payload, then sign the ciphertext.
    EncryptThenSign,
    /// Sign the plaintext, then encrypt payload and signature together.
    SignThenEncrypt,
}

impl Default for CipherOrder {
    fn default() -> Self {
        Self::EncryptThenSign
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "tollgate:tickets:".to_string()
}

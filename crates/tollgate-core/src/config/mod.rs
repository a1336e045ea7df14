//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod cleaner;
pub mod logging;
pub mod logout;
pub mod registry;
pub mod ticket;

use serde::{Deserialize, Serialize};

use self::cleaner::CleanerConfig;
use self::logging::LoggingConfig;
use self::logout::LogoutConfig;
use self::registry::RegistryConfig;
use self::ticket::TicketConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay). Every
/// section carries serde defaults, so a missing file yields a working
/// single-node in-memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Ticket policy and id generation settings.
    #[serde(default)]
    pub ticket: TicketConfig,
    /// Ticket registry backend settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Expired-ticket cleanup settings.
    #[serde(default)]
    pub cleaner: CleanerConfig,
    /// Single logout settings.
    #[serde(default)]
    pub logout: LogoutConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TollgateConfig {
    fn default() -> Self {
        Self {
            ticket: TicketConfig::default(),
            registry: RegistryConfig::default(),
            cleaner: CleanerConfig::default(),
            logout: LogoutConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TollgateConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `TOLLGATE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TOLLGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_single_node_memory() {
        let config = TollgateConfig::default();
        assert_eq!(config.registry.provider, "memory");
        assert_eq!(config.cleaner.lock.provider, "memory");
        assert!(!config.registry.crypto.enabled);
        assert!(!config.logout.disabled);
    }
}

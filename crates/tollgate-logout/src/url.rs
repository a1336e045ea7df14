//! Logout URL resolution.
//!
//! An ordered chain of resolvers turns a visited service into zero or more
//! logout destinations. The first resolver that supports the service wins;
//! later chain members are not consulted for it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use reqwest::Url;

use tollgate_core::config::logout::LogoutConfig;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_ticket::ServiceRef;

use crate::request::{LogoutChannel, LogoutDestination};

/// One member of the ordered logout URL resolution chain.
pub trait LogoutUrlResolver: Send + Sync + fmt::Debug + 'static {
    /// Chain position; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Whether this resolver can produce destinations for the service.
    fn supports(&self, service: &ServiceRef) -> bool;

    /// Zero or more logout destinations for the service.
    fn resolve(&self, service: &ServiceRef) -> AppResult<Vec<LogoutDestination>>;
}

fn channel_for(front_channel: &HashSet<String>, service_id: &str) -> LogoutChannel {
    if front_channel.contains(service_id) {
        LogoutChannel::FrontChannel
    } else {
        LogoutChannel::BackChannel
    }
}

/// Resolves logout URLs from explicit per-service configuration.
///
/// Runs before [`DefaultLogoutUrlResolver`], so a configured URL always
/// overrides the service's own URL.
#[derive(Debug)]
pub struct StaticLogoutUrlResolver {
    urls: HashMap<String, String>,
    front_channel: HashSet<String>,
}

impl StaticLogoutUrlResolver {
    /// Build the resolver from logout configuration.
    pub fn from_config(config: &LogoutConfig) -> Self {
        Self {
            urls: config.logout_urls.clone(),
            front_channel: config.front_channel_services.iter().cloned().collect(),
        }
    }
}

impl LogoutUrlResolver for StaticLogoutUrlResolver {
    fn order(&self) -> i32 {
        0
    }

    fn supports(&self, service: &ServiceRef) -> bool {
        self.urls.contains_key(&service.id)
    }

    fn resolve(&self, service: &ServiceRef) -> AppResult<Vec<LogoutDestination>> {
        let Some(url) = self.urls.get(&service.id) else {
            return Ok(Vec::new());
        };
        Url::parse(url).map_err(|e| {
            AppError::configuration(format!(
                "Configured logout URL for service '{}' is invalid: {e}",
                service.id
            ))
        })?;

        Ok(vec![LogoutDestination {
            url: url.clone(),
            channel: channel_for(&self.front_channel, &service.id),
        }])
    }
}

/// Fallback resolver: the service is notified at its own URL.
///
/// Runs last in the chain and supports any service whose original URL is
/// absolute http(s).
#[derive(Debug)]
pub struct DefaultLogoutUrlResolver {
    front_channel: HashSet<String>,
}

impl DefaultLogoutUrlResolver {
    /// Build the resolver from logout configuration.
    pub fn from_config(config: &LogoutConfig) -> Self {
        Self {
            front_channel: config.front_channel_services.iter().cloned().collect(),
        }
    }
}

impl LogoutUrlResolver for DefaultLogoutUrlResolver {
    fn order(&self) -> i32 {
        i32::MAX
    }

    fn supports(&self, service: &ServiceRef) -> bool {
        matches!(
            Url::parse(&service.original_url),
            Ok(url) if url.scheme() == "http" || url.scheme() == "https"
        )
    }

    fn resolve(&self, service: &ServiceRef) -> AppResult<Vec<LogoutDestination>> {
        Ok(vec![LogoutDestination {
            url: service.original_url.clone(),
            channel: channel_for(&self.front_channel, &service.id),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(service_id: &str, url: &str) -> LogoutConfig {
        let mut config = LogoutConfig::default();
        config
            .logout_urls
            .insert(service_id.to_string(), url.to_string());
        config
    }

    #[test]
    fn test_static_resolver_configured_only() {
        let resolver =
            StaticLogoutUrlResolver::from_config(&config_with_url("app", "https://app.example.org/logout"));

        let configured = ServiceRef::new("app", "https://app.example.org/");
        let other = ServiceRef::new("wiki", "https://wiki.example.org/");
        assert!(resolver.supports(&configured));
        assert!(!resolver.supports(&other));

        let destinations = resolver.resolve(&configured).unwrap();
        assert_eq!(
            destinations,
            vec![LogoutDestination::back_channel("https://app.example.org/logout")]
        );
    }

    #[test]
    fn test_static_resolver_invalid_url() {
        let resolver = StaticLogoutUrlResolver::from_config(&config_with_url("app", "not a url"));
        let service = ServiceRef::new("app", "https://app.example.org/");

        assert!(resolver.supports(&service));
        assert!(resolver.resolve(&service).is_err());
    }

    #[test]
    fn test_default_resolver_service_url() {
        let resolver = DefaultLogoutUrlResolver::from_config(&LogoutConfig::default());
        let service = ServiceRef::new("app", "https://app.example.org/");

        assert!(resolver.supports(&service));
        let destinations = resolver.resolve(&service).unwrap();
        assert_eq!(
            destinations,
            vec![LogoutDestination::back_channel("https://app.example.org/")]
        );
    }

    #[test]
    fn test_default_resolver_requires_http() {
        let resolver = DefaultLogoutUrlResolver::from_config(&LogoutConfig::default());
        assert!(!resolver.supports(&ServiceRef::new("app", "not a url")));
        assert!(!resolver.supports(&ServiceRef::new("app", "ftp://files.example.org/")));
        assert!(resolver.supports(&ServiceRef::new("app", "http://app.example.org/")));
    }

    #[test]
    fn test_front_channel_services() {
        let mut config = config_with_url("portal", "https://portal.example.org/logout");
        config.front_channel_services.push("portal".to_string());

        let resolver = StaticLogoutUrlResolver::from_config(&config);
        let destinations = resolver
            .resolve(&ServiceRef::new("portal", "https://portal.example.org/"))
            .unwrap();
        assert_eq!(destinations[0].channel, LogoutChannel::FrontChannel);
    }

    #[test]
    fn test_default_resolver_ordered_last() {
        let static_resolver =
            StaticLogoutUrlResolver::from_config(&config_with_url("app", "https://app.example.org/logout"));
        let default_resolver = DefaultLogoutUrlResolver::from_config(&LogoutConfig::default());
        assert!(static_resolver.order() < default_resolver.order());
    }
}

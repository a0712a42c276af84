//! # Builder for FetchConfig
//!
//! Fluent construction of a [`FetchConfig`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use maven_fetch::{Expiration, FetchConfig};
//! use maven_fetch::proxy::ProxyConfig;
//!
//! let config = FetchConfig::builder()
//!     .with_repository_url("https://repo.example.com/maven2")
//!     .with_connect_timeout(Duration::from_secs(15))
//!     .with_expiration(Expiration::Never)
//!     .with_proxy(ProxyConfig::all("http://proxy.example.com:8080"))
//!     .build();
//!
//! assert_eq!(config.repository_url, "https://repo.example.com/maven2");
//! ```

use std::time::Duration;

use crate::config::USER_AGENT_ENV;
use crate::proxy::{ProxyConfig, proxy_from_env};
use crate::{FetchConfig, cache::Expiration};

/// Builder for creating FetchConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Start from the defaults plus the proxy and user agent found in the environment
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Some(proxy) = proxy_from_env() {
            builder = builder.with_proxy(proxy);
        }
        if let Some(agent) = std::env::var(USER_AGENT_ENV)
            .ok()
            .filter(|a| !a.trim().is_empty())
        {
            builder = builder.with_user_agent(agent);
        }
        builder
    }

    /// Set the repository root, trailing slashes are ignored
    pub fn with_repository_url(mut self, url: impl Into<String>) -> Self {
        self.config.repository_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the connection timeout (time to establish initial connection)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout (maximum time between receiving data chunks)
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.config.expiration = expiration;
        self
    }

    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl Default for FetchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REPOSITORY_URL;

    #[test]
    fn test_builder_defaults() {
        let config = FetchConfigBuilder::new().build();
        assert_eq!(config.repository_url, DEFAULT_REPOSITORY_URL);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert!(config.proxy.is_none());
        assert_eq!(config.expiration, Expiration::default());
        assert!(config.user_agent.starts_with("flyway-cli/"));
    }

    #[test]
    fn test_builder_customization() {
        let config = FetchConfigBuilder::new()
            .with_repository_url("http://127.0.0.1:8081/maven2/")
            .with_user_agent("npm/10.0.0 node/v20.0.0")
            .with_read_timeout(Duration::ZERO)
            .with_expiration(Expiration::Never)
            .with_proxy(ProxyConfig::all("http://proxy:3128"))
            .build();

        assert_eq!(config.repository_url, "http://127.0.0.1:8081/maven2");
        assert_eq!(config.user_agent, "npm/10.0.0 node/v20.0.0");
        assert!(config.read_timeout.is_zero());
        assert_eq!(config.expiration, Expiration::Never);
        assert_eq!(config.proxy.unwrap().url, "http://proxy:3128");
    }
}

use std::time::Duration;

use crate::{cache::Expiration, proxy::ProxyConfig};

/// Maven Central, where Flyway publishes its distributions
pub const DEFAULT_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2";

/// Environment variable a package manager uses to announce its user agent
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

const DEFAULT_USER_AGENT: &str = concat!("flyway-cli/", env!("CARGO_PKG_VERSION"));

/// Configurable options for fetching artifacts
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root of the Maven-style repository
    pub repository_url: String,

    /// User agent string
    pub user_agent: String,

    /// Connection timeout (time to establish initial connection), zero disables it
    pub connect_timeout: Duration,

    /// Read timeout (maximum time between receiving data chunks), zero disables it
    pub read_timeout: Duration,

    /// Proxy configuration (optional)
    pub proxy: Option<ProxyConfig>,

    /// How long downloaded files stay valid
    pub expiration: Expiration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            repository_url: DEFAULT_REPOSITORY_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            proxy: None,
            expiration: Expiration::default(),
        }
    }
}

impl FetchConfig {
    pub fn builder() -> crate::builder::FetchConfigBuilder {
        crate::builder::FetchConfigBuilder::new()
    }
}

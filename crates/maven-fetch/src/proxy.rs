use reqwest::Proxy;

/// Environment variables consulted for a proxy, highest precedence first
pub const PROXY_ENV_VARS: &[&str] = &[
    "npm_config_https_proxy",
    "npm_config_proxy",
    "npm_config_http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "HTTP_PROXY",
    "http_proxy",
];

/// Proxy applied to every request, whatever the scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "http://proxy.example.com:8080"); `user:pass@` credentials are kept
    pub url: String,
}

impl ProxyConfig {
    pub fn all(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Find the proxy to use from the process environment
pub fn proxy_from_env() -> Option<ProxyConfig> {
    proxy_from_lookup(|name| std::env::var(name).ok())
}

/// Find the proxy to use, reading variables through `lookup`.
///
/// The first non-empty variable of [`PROXY_ENV_VARS`] wins.
pub fn proxy_from_lookup<F>(lookup: F) -> Option<ProxyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    PROXY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(ProxyConfig::all)
}

/// Build a reqwest Proxy object from our proxy configuration
pub fn build_proxy_from_config(config: &ProxyConfig) -> Result<Proxy, String> {
    Proxy::all(&config.url).map_err(|e| format!("Invalid proxy URL {}: {e}", config.url))
}

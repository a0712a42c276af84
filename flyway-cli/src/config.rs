use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use maven_fetch::{
    ArtifactRequest, ArtifactsConfig, Expiration, FetchConfig, FetchConfigBuilder, Platform,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::utils::expand_env_vars;

/// A scalar value in `flywayArgs` or `env`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Integer(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

/// An extra artifact downloaded next to Flyway
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenPlugin {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Explicit download location, used instead of the repository layout
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadsConfig {
    /// Where downloads are stored; must be writable
    pub storage_directory: Option<PathBuf>,
    /// Cache lifetime, `-1` never checks for updates
    pub expiration_time_in_ms: Option<i64>,
    /// Alternative Maven repository root
    pub repository_url: Option<String>,
}

/// Contents of the `--configfile` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlywayConfig {
    /// Passed to Flyway as `-key=value`, in file order
    pub flyway_args: IndexMap<String, ArgValue>,
    /// Extra environment for the Flyway process
    pub env: IndexMap<String, ArgValue>,
    /// Flyway version, empty or missing downloads the latest
    pub version: Option<String>,
    pub download_url: Option<String>,
    #[serde(alias = "mavinPlugins")]
    pub maven_plugins: Vec<MavenPlugin>,
    pub downloads: DownloadsConfig,
}

impl FlywayConfig {
    /// Load a JSON (`.json`) or TOML (anything else) configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Unable to read config file {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
        .map_err(|e| AppError::config(format!("Invalid config file {}: {e}", path.display())))?;

        config.expand_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Replace `${NAME}` placeholders in `flywayArgs` and `env` values
    pub fn expand_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for value in self.flyway_args.values_mut().chain(self.env.values_mut()) {
            if let ArgValue::Text(text) = value {
                *text = expand_env_vars(text, &lookup);
            }
        }
    }

    /// Environment overrides for the Flyway process
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }

    pub fn expiration(&self) -> Expiration {
        self.downloads
            .expiration_time_in_ms
            .map(Expiration::from_millis)
            .unwrap_or_default()
    }

    /// Download settings: environment defaults, command-line timeouts, then the file
    pub fn fetch_config(&self, connect_timeout: Duration, read_timeout: Duration) -> FetchConfig {
        let mut builder = FetchConfigBuilder::from_env()
            .with_connect_timeout(connect_timeout)
            .with_read_timeout(read_timeout)
            .with_expiration(self.expiration());

        if let Some(url) = self.downloads.repository_url.as_deref() {
            builder = builder.with_repository_url(url);
        }

        builder.build()
    }

    /// The Flyway distribution plus every configured plugin
    pub fn artifacts_config(&self, platform: Platform) -> ArtifactsConfig {
        let flyway = ArtifactRequest::flyway(self.version.as_deref(), self.download_url.as_deref());
        let plugins = self
            .maven_plugins
            .iter()
            .map(|p| {
                ArtifactRequest::new(
                    &p.group_id,
                    &p.artifact_id,
                    p.version.as_deref(),
                    p.download_url.as_deref(),
                )
            })
            .collect();

        ArtifactsConfig::new(flyway, platform)
            .with_plugins(plugins)
            .with_storage_directory(self.downloads.storage_directory.clone())
    }
}

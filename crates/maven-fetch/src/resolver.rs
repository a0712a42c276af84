//! # Version Resolver
//!
//! Turns a [`VersionSpec`] into a concrete version. `latest` is answered from
//! the repository's `maven-metadata.xml`, cached next to the downloads.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::Fetcher;
use crate::artifact::{VersionSpec, metadata_url};
use crate::cache::{Expiration, latest_cache_file};
use crate::error::{ArtifactError, Result};

/// Release versions only: a non-zero leading digit followed by digits and dots
static STABLE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9.]*$").expect("stable version pattern is valid"));

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    versioning: Versioning,
}

#[derive(Debug, Default, Deserialize)]
struct Versioning {
    #[serde(default)]
    versions: Versions,
}

#[derive(Debug, Default, Deserialize)]
struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

/// Versions listed in a `maven-metadata.xml` document, in document order
pub fn parse_metadata(xml: &str) -> Result<Vec<String>> {
    let metadata: Metadata = quick_xml::de::from_str(xml)
        .map_err(|e| ArtifactError::resolution(format!("Invalid maven metadata: {e}")))?;

    Ok(metadata
        .versioning
        .versions
        .version
        .into_iter()
        .map(|v| v.trim().to_string())
        .collect())
}

/// Whether `version` is a release rather than an alpha, beta or RC build
pub fn is_stable_version(version: &str) -> bool {
    STABLE_VERSION.is_match(version)
}

/// The last stable version in document order.
///
/// Maven metadata lists versions oldest first, so no version comparison is done.
pub fn select_latest(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .filter(|v| is_stable_version(v))
        .next_back()
        .map(String::as_str)
}

impl Fetcher {
    /// Resolve `spec` to a concrete version or direct download URL
    pub async fn resolve_version(
        &self,
        lib_dir: &Path,
        group_id: &str,
        artifact_id: &str,
        spec: &VersionSpec,
        expiration: Expiration,
    ) -> Result<String> {
        match spec {
            VersionSpec::Exact(version) | VersionSpec::Url(version) => Ok(version.clone()),
            VersionSpec::Latest => {
                let cache_file = latest_cache_file(lib_dir, group_id, artifact_id);
                let url = metadata_url(&self.config().repository_url, group_id, artifact_id);
                let metadata_path = self.fetch(&cache_file, &url, expiration).await?;

                let raw = fs::read(&metadata_path).await?;
                let xml = String::from_utf8(raw).map_err(|e| {
                    ArtifactError::resolution(format!("Invalid maven metadata: {e}"))
                })?;
                let versions = parse_metadata(&xml)?;
                let latest = select_latest(&versions).ok_or_else(|| {
                    ArtifactError::resolution(format!(
                        "Stable version of {group_id}_{artifact_id} not found"
                    ))
                })?;

                debug!(group_id, artifact_id, version = latest, "Resolved latest version");
                Ok(latest.to_string())
            }
        }
    }
}

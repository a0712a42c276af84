//! # Artifact Identity
//!
//! Maven coordinates of the artifacts the CLI needs, and the URLs and file
//! names they map to in a Maven-style repository layout.

use std::path::PathBuf;

use url::Url;

use crate::error::{ArtifactError, Result};

/// Group of the Flyway command-line distribution
pub const FLYWAY_GROUP_ID: &str = "org.flywaydb";
/// Artifact id of the Flyway command-line distribution
pub const FLYWAY_ARTIFACT_ID: &str = "flyway-commandline";

/// What version of an artifact was asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Newest stable version listed in the repository metadata
    Latest,
    /// A concrete version such as `6.3.2`
    Exact(String),
    /// A direct download URL that bypasses the repository layout
    Url(String),
}

impl VersionSpec {
    /// Interpret a configured version token.
    ///
    /// Missing, empty and `latest` tokens all mean [`VersionSpec::Latest`].
    pub fn parse(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            None | Some("") | Some("latest") => VersionSpec::Latest,
            Some(t) if is_url(t) => VersionSpec::Url(t.to_string()),
            Some(t) => VersionSpec::Exact(t.to_string()),
        }
    }
}

/// Whether a resolved version token is really a direct download URL
pub fn is_url(token: &str) -> bool {
    token.starts_with("https://") || token.starts_with("http://")
}

/// How an artifact is used once downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The runnable Flyway distribution
    Command,
    /// A plain file placed next to the distribution, e.g. a plugin jar
    Asset,
}

/// One artifact to fetch, created fresh for each CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub group_id: String,
    pub artifact_id: String,
    pub version: VersionSpec,
}

impl ArtifactRequest {
    /// Build a request; an explicit `download_url` wins over `version`.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Option<&str>,
        download_url: Option<&str>,
    ) -> Self {
        let token = download_url.filter(|u| !u.trim().is_empty()).or(version);
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: VersionSpec::parse(token),
        }
    }

    /// The Flyway command-line distribution itself
    pub fn flyway(version: Option<&str>, download_url: Option<&str>) -> Self {
        Self::new(FLYWAY_GROUP_ID, FLYWAY_ARTIFACT_ID, version, download_url)
    }

    pub fn is_flyway(&self) -> bool {
        self.group_id == FLYWAY_GROUP_ID && self.artifact_id == FLYWAY_ARTIFACT_ID
    }
}

/// A downloaded artifact with its concrete version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Concrete version, or the download URL for direct downloads
    pub version: String,
    pub kind: ArtifactKind,
    pub file: PathBuf,
}

/// Where an artifact ended up after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    Dir(PathBuf),
    File(PathBuf),
}

/// Terminal output of the pipeline for one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtifact {
    pub version: String,
    pub kind: ArtifactKind,
    pub location: ArtifactLocation,
}

/// Maven group id as a repository path (`org.flywaydb` -> `org/flywaydb`)
pub fn group_path(group_id: &str) -> String {
    group_id.replace('.', "/")
}

fn repo_root(repository: &str) -> &str {
    repository.trim_end_matches('/')
}

/// `{repo}/{group-path}/{artifact}/maven-metadata.xml`
pub fn metadata_url(repository: &str, group_id: &str, artifact_id: &str) -> String {
    format!(
        "{}/{}/{artifact_id}/maven-metadata.xml",
        repo_root(repository),
        group_path(group_id)
    )
}

/// `{repo}/{group-path}/{artifact}/{version}/{file_name}`
pub fn artifact_url(
    repository: &str,
    group_id: &str,
    artifact_id: &str,
    version: &str,
    file_name: &str,
) -> String {
    format!(
        "{}/{}/{artifact_id}/{version}/{file_name}",
        repo_root(repository),
        group_path(group_id)
    )
}

/// File name of the platform distribution, e.g. `flyway-commandline-6.3.2-linux-x64.tar.gz`
pub fn command_file_name(artifact_id: &str, version: &str, suffix: &str) -> String {
    format!("{artifact_id}-{version}-{suffix}")
}

/// File name of a plain jar dependency
pub fn jar_file_name(artifact_id: &str, version: &str) -> String {
    format!("{artifact_id}-{version}.jar")
}

/// Last path segment of a direct download URL
pub fn url_file_name(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| ArtifactError::resolution(format!("Invalid URL {url}: {e}")))?;

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(str::to_string)
        .ok_or_else(|| ArtifactError::resolution(format!("No file name in URL {url}")))
}

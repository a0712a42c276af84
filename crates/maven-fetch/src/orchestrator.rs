//! # Artifact Orchestrator
//!
//! Runs the resolve, download and extract pipeline for the Flyway
//! distribution and every configured plugin, and finds the launcher inside
//! the extracted distribution.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::Fetcher;
use crate::artifact::{
    ArtifactKind, ArtifactLocation, ArtifactRequest, ExtractedArtifact, ResolvedArtifact,
    artifact_url, command_file_name, is_url, jar_file_name, url_file_name,
};
use crate::error::{ArtifactError, Result};
use crate::extract::extract;
use crate::platform::Platform;

/// Environment variables that may point at a cache directory, highest precedence first
pub const CACHE_DIR_ENV_VARS: &[&str] = &[
    "NPM_CACHE_DIR",
    "npm_config_cache",
    "HOME",
    "HOMEPATH",
    "USERPROFILE",
];

/// Everything needed to make the Flyway launcher available locally
#[derive(Debug, Clone)]
pub struct ArtifactsConfig {
    pub flyway: ArtifactRequest,
    pub plugins: Vec<ArtifactRequest>,
    /// Library directory; relative paths are resolved against the current directory
    pub storage_directory: Option<PathBuf>,
    pub platform: Platform,
}

impl ArtifactsConfig {
    pub fn new(flyway: ArtifactRequest, platform: Platform) -> Self {
        Self {
            flyway,
            plugins: Vec::new(),
            storage_directory: None,
            platform,
        }
    }

    pub fn with_plugins(mut self, plugins: Vec<ArtifactRequest>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_storage_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.storage_directory = dir;
        self
    }
}

/// Default library directory below the first cache location found through `lookup`
pub fn default_lib_dir<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let base = CACHE_DIR_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    base.join("flyway-cli").join("jlib")
}

/// Resolve the library directory and make sure it can be written to
pub async fn ensure_lib_dir(storage_directory: Option<&Path>) -> Result<PathBuf> {
    let lib_dir = match storage_directory {
        Some(dir) => std::path::absolute(dir)?,
        None => std::path::absolute(default_lib_dir(|name| std::env::var(name).ok()))?,
    };

    match fs::metadata(&lib_dir).await {
        Ok(meta) if meta.is_dir() => check_writable(&lib_dir).await?,
        Ok(_) => {
            return Err(ArtifactError::config(format!(
                "Storage directory {} is not a directory",
                lib_dir.display()
            )));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = ?lib_dir, "Creating storage directory");
            fs::create_dir_all(&lib_dir).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(lib_dir)
}

async fn check_writable(dir: &Path) -> Result<()> {
    let target = dir.to_path_buf();
    let created = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".write-check-")
            .tempfile_in(&target)
    })
    .await
    .map_err(|e| ArtifactError::config(format!("Writability check failed: {e}")))?;

    match created {
        Ok(probe) => {
            let path = probe.path().to_path_buf();
            if let Err(e) = probe.close() {
                warn!(path = ?path, error = %e, "Failed to remove write check file");
            }
            Ok(())
        }
        Err(e) => Err(ArtifactError::config(format!(
            "Storage directory {} is not writable: {e}",
            dir.display()
        ))),
    }
}

/// Find the launcher inside an extracted distribution.
///
/// Checks `flyway-{version}/{exe}`, then any direct subdirectory holding the
/// launcher, then the directory itself. When nothing exists the first
/// candidate is returned so the caller can report it as missing.
pub async fn locate_executable(dir: &Path, version: &str, platform: Platform) -> PathBuf {
    let exe = platform.executable_name();
    let expected = if is_url(version) {
        dir.join(exe)
    } else {
        dir.join(format!("flyway-{version}")).join(exe)
    };

    if fs::try_exists(&expected).await.unwrap_or(false) {
        return expected;
    }

    let mut subdirs = Vec::new();
    if let Ok(mut entries) = fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                subdirs.push(entry.path());
            }
        }
    }
    subdirs.sort();

    for subdir in subdirs {
        let candidate = subdir.join(exe);
        if fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
    }

    let top_level = dir.join(exe);
    if fs::try_exists(&top_level).await.unwrap_or(false) {
        return top_level;
    }

    expected
}

impl Fetcher {
    /// Resolve the version of `request` and download it into `lib_dir`
    pub async fn download_artifact(
        &self,
        lib_dir: &Path,
        request: &ArtifactRequest,
        platform: Platform,
    ) -> Result<ResolvedArtifact> {
        let expiration = self.config().expiration;
        let version = self
            .resolve_version(
                lib_dir,
                &request.group_id,
                &request.artifact_id,
                &request.version,
                expiration,
            )
            .await?;

        let repository = &self.config().repository_url;
        let (kind, file_name, url) = if is_url(&version) {
            (ArtifactKind::Asset, url_file_name(&version)?, version.clone())
        } else if request.is_flyway() {
            let name = command_file_name(&request.artifact_id, &version, platform.archive_suffix());
            let url = artifact_url(
                repository,
                &request.group_id,
                &request.artifact_id,
                &version,
                &name,
            );
            (ArtifactKind::Command, name, url)
        } else {
            // Anything besides Flyway itself is a plain jar
            let name = jar_file_name(&request.artifact_id, &version);
            let url = artifact_url(
                repository,
                &request.group_id,
                &request.artifact_id,
                &version,
                &name,
            );
            (ArtifactKind::Asset, name, url)
        };

        let file = self.fetch(&lib_dir.join(file_name), &url, expiration).await?;

        Ok(ResolvedArtifact {
            version,
            kind,
            file,
        })
    }

    /// Full pipeline for one artifact
    pub async fn ensure_artifact(
        &self,
        lib_dir: &Path,
        request: &ArtifactRequest,
        platform: Platform,
    ) -> Result<ExtractedArtifact> {
        let resolved = self.download_artifact(lib_dir, request, platform).await?;
        extract(lib_dir, &request.artifact_id, resolved).await
    }

    /// Fetch Flyway and all plugins concurrently and return the launcher path.
    ///
    /// Fails as soon as any pipeline fails.
    pub async fn ensure_artifacts(&self, config: &ArtifactsConfig) -> Result<PathBuf> {
        let lib_dir = ensure_lib_dir(config.storage_directory.as_deref()).await?;
        debug!(dir = ?lib_dir, plugins = config.plugins.len(), "Ensuring artifacts");

        let pipelines = std::iter::once(&config.flyway)
            .chain(config.plugins.iter())
            .map(|request| self.ensure_artifact(&lib_dir, request, config.platform));
        let artifacts = try_join_all(pipelines).await?;

        let Some(flyway) = artifacts.into_iter().next() else {
            return Err(ArtifactError::config("No Flyway artifact was requested"));
        };
        match flyway.location {
            ArtifactLocation::Dir(dir) => {
                let executable = locate_executable(&dir, &flyway.version, config.platform).await;
                info!(version = %flyway.version, path = ?executable, "Flyway ready");
                Ok(executable)
            }
            ArtifactLocation::File(file) => Err(ArtifactError::config(format!(
                "Flyway download {} is not an archive",
                file.display()
            ))),
        }
    }
}

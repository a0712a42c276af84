//! # Archive Extractor
//!
//! Unpacks downloaded distributions into `{lib_dir}/{artifact_id}-{version}`.
//! An existing target directory is taken as already extracted. Zip archives
//! are unpacked in-process; gzip and xz tarballs go through the system `tar`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::artifact::{ArtifactLocation, ExtractedArtifact, ResolvedArtifact, is_url};
use crate::error::{ArtifactError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Zip,
    Tarball,
}

impl ArchiveFormat {
    fn detect(file: &Path) -> Option<Self> {
        match file.extension().and_then(|e| e.to_str()) {
            Some("zip") => Some(ArchiveFormat::Zip),
            Some("gz") | Some("xz") => Some(ArchiveFormat::Tarball),
            _ => None,
        }
    }
}

/// Directory an archive is extracted into.
///
/// Direct downloads use the archive name instead of the version, since their
/// "version" is the download URL.
pub fn extract_dir(lib_dir: &Path, artifact_id: &str, resolved: &ResolvedArtifact) -> PathBuf {
    let label = if is_url(&resolved.version) {
        archive_stem(&resolved.file)
    } else {
        resolved.version.clone()
    };
    lib_dir.join(format!("{artifact_id}-{label}"))
}

fn archive_stem(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(".tar") {
        Some(inner) => inner.to_string(),
        None => stem,
    }
}

/// Extract `resolved` if it is an archive, otherwise pass the file through
pub async fn extract(
    lib_dir: &Path,
    artifact_id: &str,
    resolved: ResolvedArtifact,
) -> Result<ExtractedArtifact> {
    let Some(format) = ArchiveFormat::detect(&resolved.file) else {
        return Ok(ExtractedArtifact {
            version: resolved.version,
            kind: resolved.kind,
            location: ArtifactLocation::File(resolved.file),
        });
    };

    let target = extract_dir(lib_dir, artifact_id, &resolved);

    if fs::try_exists(&target).await? {
        debug!(dir = ?target, "Archive already extracted");
    } else {
        fs::create_dir(&target).await?;
        info!(archive = ?resolved.file, dir = ?target, "Extracting");

        let result = match format {
            ArchiveFormat::Zip => unzip(&resolved.file, &target).await,
            ArchiveFormat::Tarball => untar(&resolved.file, &target).await,
        };

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_dir_all(&target).await {
                warn!(dir = ?target, error = %cleanup, "Failed to remove partially extracted directory");
            }
            return Err(e);
        }
    }

    Ok(ExtractedArtifact {
        version: resolved.version,
        kind: resolved.kind,
        location: ArtifactLocation::Dir(target),
    })
}

async fn unzip(archive: &Path, target: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let target = target.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive)?;
        let mut zip = ZipArchive::new(file).map_err(|e| {
            ArtifactError::extraction(format!("Invalid zip archive {}: {e}", archive.display()))
        })?;
        zip.extract(&target).map_err(|e| {
            ArtifactError::extraction(format!("Unzipping {} failed: {e}", archive.display()))
        })
    })
    .await
    .map_err(|e| ArtifactError::extraction(format!("Extraction task failed: {e}")))?
}

async fn untar(archive: &Path, target: &Path) -> Result<()> {
    // tar runs inside the target directory, so the archive path must not be relative
    let archive = std::path::absolute(archive)?;

    let status = Command::new("tar")
        .arg("zxf")
        .arg(&archive)
        .current_dir(target)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| ArtifactError::extraction(format!("Failed to run tar: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(ArtifactError::extraction(format!(
            "Untaring file failed {}",
            status
                .code()
                .map_or_else(|| "(terminated by signal)".to_string(), |c| c.to_string())
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::test_utils::zip_with_entry;

    fn resolved(version: &str, file: PathBuf) -> ResolvedArtifact {
        ResolvedArtifact {
            version: version.to_string(),
            kind: ArtifactKind::Command,
            file,
        }
    }

    #[tokio::test]
    async fn test_plain_file_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("slf4j-api-1.7.25.jar");
        std::fs::write(&jar, b"jar").unwrap();

        let extracted = extract(dir.path(), "slf4j-api", resolved("1.7.25", jar.clone()))
            .await
            .unwrap();

        assert_eq!(extracted.location, ArtifactLocation::File(jar));
        assert!(!dir.path().join("slf4j-api-1.7.25").exists());
    }

    #[tokio::test]
    async fn test_unzip_into_versioned_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flyway-commandline-6.3.2-windows-x64.zip");
        std::fs::write(&archive, zip_with_entry("flyway-6.3.2/flyway.cmd")).unwrap();

        let extracted = extract(dir.path(), "flyway-commandline", resolved("6.3.2", archive))
            .await
            .unwrap();

        let target = dir.path().join("flyway-commandline-6.3.2");
        assert_eq!(extracted.location, ArtifactLocation::Dir(target.clone()));
        assert!(target.join("flyway-6.3.2").join("flyway.cmd").is_file());
    }

    #[tokio::test]
    async fn test_existing_dir_is_not_extracted_again() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("flyway-commandline-6.3.2");
        std::fs::create_dir(&target).unwrap();
        // Not a valid archive: any extraction attempt would fail
        let archive = dir.path().join("flyway-commandline-6.3.2-linux-x64.tar.gz");
        std::fs::write(&archive, b"garbage").unwrap();

        let extracted = extract(dir.path(), "flyway-commandline", resolved("6.3.2", archive))
            .await
            .unwrap();

        assert_eq!(extracted.location, ArtifactLocation::Dir(target.clone()));
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_unzip_removes_target() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = extract(dir.path(), "flyway-commandline", resolved("6.3.2", archive))
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::Extraction(_)));
        assert!(!dir.path().join("flyway-commandline-6.3.2").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_untar_with_system_tar() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        std::fs::create_dir_all(staging.join("flyway-6.3.2")).unwrap();
        std::fs::write(staging.join("flyway-6.3.2").join("flyway"), b"#!/bin/sh\n").unwrap();

        let archive = dir.path().join("flyway-commandline-6.3.2-linux-x64.tar.gz");
        let status = std::process::Command::new("tar")
            .arg("czf")
            .arg(&archive)
            .arg("flyway-6.3.2")
            .current_dir(&staging)
            .status()
            .unwrap();
        assert!(status.success());

        let extracted = extract(dir.path(), "flyway-commandline", resolved("6.3.2", archive))
            .await
            .unwrap();

        let target = dir.path().join("flyway-commandline-6.3.2");
        assert_eq!(extracted.location, ArtifactLocation::Dir(target.clone()));
        assert!(target.join("flyway-6.3.2").join("flyway").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_untar_removes_target() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flyway-commandline-6.3.2-linux-x64.tar.gz");
        std::fs::write(&archive, b"garbage").unwrap();

        let err = extract(dir.path(), "flyway-commandline", resolved("6.3.2", archive))
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::Extraction(_)));
        assert!(!dir.path().join("flyway-commandline-6.3.2").exists());
    }

    #[test]
    fn test_extract_dir_for_direct_download() {
        let lib = Path::new("/lib");
        let direct = resolved(
            "https://example.com/flyway-commandline-7.0.0-linux-x64.tar.gz",
            lib.join("flyway-commandline-7.0.0-linux-x64.tar.gz"),
        );
        assert_eq!(
            extract_dir(lib, "flyway-commandline", &direct),
            lib.join("flyway-commandline-flyway-commandline-7.0.0-linux-x64")
        );
    }
}

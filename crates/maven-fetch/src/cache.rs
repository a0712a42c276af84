//! # Artifact Cache
//!
//! Downloaded files live at deterministic paths inside the library directory.
//! The file modification time is the only staleness signal: a file younger
//! than the expiration window is trusted as-is, without any content check.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::debug;

/// One day, the default staleness window
pub const DEFAULT_EXPIRATION_MS: i64 = 86_400_000;

/// How long a cached download stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Cached files are never refreshed
    Never,
    /// Cached files older than this are downloaded again
    After(Duration),
}

impl Expiration {
    /// Build from a millisecond value; negative values (`-1` by convention) never expire.
    pub fn from_millis(ms: i64) -> Self {
        if ms < 0 {
            Expiration::Never
        } else {
            Expiration::After(Duration::from_millis(ms.unsigned_abs()))
        }
    }

    /// Whether a file last modified at `modified` is still valid at `now`
    pub fn is_fresh_at(self, modified: SystemTime, now: SystemTime) -> bool {
        match self {
            Expiration::Never => true,
            // A timestamp in the future yields Err, treat it as brand new
            Expiration::After(ttl) => now
                .duration_since(modified)
                .map(|age| age < ttl)
                .unwrap_or(true),
        }
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::from_millis(DEFAULT_EXPIRATION_MS)
    }
}

/// Whether a usable cached file exists at `path`
pub async fn is_fresh(path: &Path, expiration: Expiration) -> bool {
    let metadata = match fs::metadata(path).await {
        Ok(m) if m.is_file() => m,
        _ => return false,
    };

    if expiration == Expiration::Never {
        return true;
    }

    match metadata.modified() {
        Ok(modified) => expiration.is_fresh_at(modified, SystemTime::now()),
        Err(e) => {
            debug!(path = ?path, error = %e, "File modification time unavailable, treating as stale");
            false
        }
    }
}

/// Where the `maven-metadata.xml` of an artifact is cached
pub fn latest_cache_file(lib_dir: &Path, group_id: &str, artifact_id: &str) -> PathBuf {
    lib_dir.join(format!("{group_id}_{artifact_id}.latest"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn age_file(path: &Path, age: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_expiration_from_millis() {
        assert_eq!(Expiration::from_millis(-1), Expiration::Never);
        assert_eq!(
            Expiration::from_millis(1500),
            Expiration::After(Duration::from_millis(1500))
        );
        assert_eq!(
            Expiration::default(),
            Expiration::After(Duration::from_secs(24 * 60 * 60))
        );
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let now = SystemTime::now();
        let exp = Expiration::After(Duration::from_secs(1));
        assert!(exp.is_fresh_at(now + Duration::from_secs(60), now));
        assert!(!exp.is_fresh_at(now - Duration::from_secs(2), now));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_fresh(&dir.path().join("missing"), Expiration::Never).await);
        // Directories never count as cache entries
        assert!(!is_fresh(dir.path(), Expiration::Never).await);
    }

    #[tokio::test]
    async fn test_staleness_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.jar");
        std::fs::write(&path, b"jar").unwrap();

        let one_hour = Expiration::After(Duration::from_secs(3600));
        assert!(is_fresh(&path, one_hour).await);

        age_file(&path, Duration::from_secs(2 * 3600));
        assert!(!is_fresh(&path, one_hour).await);
        assert!(is_fresh(&path, Expiration::Never).await);
    }

    #[test]
    fn test_latest_cache_file() {
        let path = latest_cache_file(Path::new("/lib"), "org.flywaydb", "flyway-commandline");
        assert_eq!(
            path,
            Path::new("/lib").join("org.flywaydb_flyway-commandline.latest")
        );
    }
}

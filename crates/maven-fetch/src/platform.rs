//! Host platform detection and the per-platform names Flyway ships with.

use crate::error::{ArtifactError, Result};

/// Platforms Flyway publishes command-line distributions for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Detect the platform this process runs on
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a supported platform
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOs),
            other => Err(ArtifactError::config(format!(
                "Your platform is not supported: {other}"
            ))),
        }
    }

    /// Classifier and extension of the command-line archive in the Maven repository
    pub fn archive_suffix(self) -> &'static str {
        match self {
            Platform::Windows => "windows-x64.zip",
            Platform::Linux => "linux-x64.tar.gz",
            Platform::MacOs => "macosx-x64.tar.gz",
        }
    }

    /// Name of the launcher script inside the extracted distribution
    pub fn executable_name(self) -> &'static str {
        match self {
            Platform::Windows => "flyway.cmd",
            Platform::Linux | Platform::MacOs => "flyway",
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_platforms() {
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
    }

    #[test]
    fn test_unsupported_platform() {
        let err = Platform::from_os("freebsd").unwrap_err();
        assert!(matches!(err, ArtifactError::Config(_)));
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(Platform::Windows.archive_suffix(), "windows-x64.zip");
        assert_eq!(Platform::Linux.archive_suffix(), "linux-x64.tar.gz");
        assert_eq!(Platform::MacOs.archive_suffix(), "macosx-x64.tar.gz");
        assert_eq!(Platform::Windows.executable_name(), "flyway.cmd");
        assert_eq!(Platform::Linux.executable_name(), "flyway");
    }
}

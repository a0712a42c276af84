//! # Maven Fetch
//!
//! Makes a Flyway command-line distribution available on the local disk.
//!
//! ## Features
//!
//! - Version resolution, including `latest` from `maven-metadata.xml`
//! - Time-based on-disk caching of every download
//! - Proxy selection from the usual `*_proxy` environment variables
//! - Zip and tarball extraction into per-version directories
//! - Concurrent download of the distribution and its plugins

pub mod artifact;
pub mod builder;
pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod platform;
pub mod proxy;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use artifact::{
    ArtifactKind, ArtifactLocation, ArtifactRequest, ExtractedArtifact, ResolvedArtifact,
    VersionSpec,
};
pub use builder::FetchConfigBuilder;
pub use cache::Expiration;
pub use config::FetchConfig;
pub use downloader::{Fetcher, create_client};
pub use error::{ArtifactError, Result};
pub use orchestrator::{ArtifactsConfig, ensure_lib_dir, locate_executable};
pub use platform::Platform;
pub use proxy::ProxyConfig;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::cache::{self, Expiration};
use crate::error::{ArtifactError, Result};
use crate::{FetchConfig, proxy::build_proxy_from_config};

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &FetchConfig) -> Result<Client> {
    let mut client_builder = Client::builder()
        .user_agent(&config.user_agent)
        .redirect(reqwest::redirect::Policy::limited(10));

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    if !config.read_timeout.is_zero() {
        client_builder = client_builder.read_timeout(config.read_timeout);
    }

    if let Some(proxy_config) = &config.proxy {
        let proxy = build_proxy_from_config(proxy_config).map_err(ArtifactError::Config)?;
        client_builder = client_builder.proxy(proxy);
        info!(proxy_url = %proxy_config.url, "Using proxy for downloads");
    } else {
        // Only the variables in PROXY_ENV_VARS decide about proxies
        client_builder = client_builder.no_proxy();
        debug!("Proxy disabled for downloads");
    }

    client_builder.build().map_err(ArtifactError::from)
}

/// Downloads files into the artifact cache
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = create_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Make sure `destination` holds the body of `url`.
    ///
    /// A file that is still fresh according to `expiration` is returned
    /// without touching the network. Otherwise the body is streamed to a
    /// sibling `.part` file and moved into place once complete.
    pub async fn fetch(
        &self,
        destination: &Path,
        url: &str,
        expiration: Expiration,
    ) -> Result<PathBuf> {
        if cache::is_fresh(destination, expiration).await {
            debug!(path = ?destination, "Using cached download");
            return Ok(destination.to_path_buf());
        }

        info!(url = %url, "Downloading");

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ArtifactError::Http {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let part_path = part_path(destination);
        match write_body(response, &part_path).await {
            Ok(size) => {
                fs::rename(&part_path, destination).await?;
                debug!(path = ?destination, size, "Download complete");
                Ok(destination.to_path_buf())
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&part_path).await {
                    warn!(path = ?part_path, error = %cleanup, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

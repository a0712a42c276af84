use reqwest::StatusCode;

/// Errors raised while resolving, downloading or unpacking an artifact
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Unable to resolve version: {0}")]
    Resolution(String),

    #[error("Request failed for {url} - {status}")]
    Http { status: StatusCode, url: String },

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    /// HTTP status code carried by the error, if it came from a non-200 response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ArtifactError::Http { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

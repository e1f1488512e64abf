//! Byte sources: local files and HTTP-FLV bodies.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::SourceConfig;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Where the FLV bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    File(PathBuf),
    /// An HTTP(S) URL whose response body is the stream.
    Http(String),
}

impl ByteSource {
    /// Anything containing `://` is a URL, everything else a path.
    pub fn from_arg(input: &str) -> Self {
        if input.contains("://") {
            Self::Http(input.to_string())
        } else {
            Self::File(PathBuf::from(input))
        }
    }

    /// Live sources are not paced by the presenter.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Open the source for sequential reading.
    ///
    /// HTTP sources use a blocking client, so call this off the async
    /// runtime.
    pub fn open(&self, config: &SourceConfig) -> Result<Box<dyn Read + Send>, SourceError> {
        match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|source| SourceError::Open {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!("Opened {:?}", path);
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Http(url) => {
                let http_err = |source: reqwest::Error| SourceError::Http {
                    url: url.clone(),
                    source,
                };

                let mut builder = reqwest::blocking::Client::builder()
                    .connect_timeout(config.connect_timeout())
                    // A live body has no natural end.
                    .timeout(None::<std::time::Duration>);
                if let Some(ref agent) = config.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                let client = builder.build().map_err(http_err)?;

                let response = client
                    .get(url.as_str())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(http_err)?;

                tracing::info!(
                    status = %response.status(),
                    content_type = ?response.headers().get(reqwest::header::CONTENT_TYPE),
                    "Connected to {}",
                    url
                );
                Ok(Box::new(BufReader::new(response)))
            }
        }
    }
}

impl std::fmt::Display for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}

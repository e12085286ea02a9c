use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure loading a [`FetchConfig`](crate::FetchConfig) from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of the freshness check or the archive download.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    BadStatus { url: String, status: StatusCode },
    #[error("error reading response body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("{url} did not advertise a content length")]
    MissingLength { url: String },
    #[error("incomplete download: received {received} of {expected} bytes")]
    Incomplete { received: u64, expected: u64 },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| FetchError::Io { path, source }
    }
}

/// Failure of the extraction stage.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("archive {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("error opening archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("corrupted archive member {member}: {reason}")]
    Corrupted { member: String, reason: String },
    #[error("archive member {0} would be written outside the target directory")]
    UnsafePath(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ExtractError::Io { path, source }
    }
}

/// Any failure surfaced by [`Api::update`](crate::Api::update).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decompression failed: {0}")]
    Extract(#[from] ExtractError),
}

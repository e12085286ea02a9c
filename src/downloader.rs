use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, error, info};
use reqwest::blocking::{Client, Response};
use reqwest::Proxy;

use crate::checksum;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::progress::ProgressFn;

/// Size of each body read while streaming to disk.
pub const CHUNK_SIZE: usize = 4096;

/// Label shown on the download progress line.
pub const DOWNLOAD_LABEL: &str = "Downloading BAN";

/// Result of a freshness check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Remote manifest matches the stored one; nothing was downloaded.
    UpToDate,
    /// A fresh archive was downloaded and verified complete.
    Downloaded { bytes: u64 },
}

/// Checks the remote manifest and downloads the archive when it changed.
pub struct Downloader {
    /// Paths and endpoints.
    pub config: FetchConfig,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

impl Downloader {
    /// Create a downloader without progress output.
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Create a downloader reporting through `progress`.
    pub fn with_progress(config: FetchConfig, progress: Option<ProgressFn>) -> Self {
        Self { config, progress }
    }

    /// Build an HTTP client, optionally with proxy support.
    ///
    /// Without an explicit proxy, system proxy settings are ignored.
    fn build_client(&self) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(self.config.connect_timeout())
            .timeout(self.config.request_timeout())
            .user_agent(concat!("banfetch/", env!("CARGO_PKG_VERSION")));
        builder = match &self.config.proxy {
            Some(proxy_url) => builder.proxy(Proxy::all(proxy_url)?),
            None => builder.no_proxy(),
        };
        builder.build()
    }

    /// Download a fresh archive if the remote manifest changed.
    ///
    /// Returns `true` only when a complete archive now sits at
    /// [`FetchConfig::archive_path`]. "Already up to date" and every failure
    /// return `false`; failures are logged.
    pub fn fetch_if_stale(&self) -> bool {
        match self.check_and_download() {
            Ok(FetchOutcome::Downloaded { .. }) => true,
            Ok(FetchOutcome::UpToDate) => false,
            Err(e) => {
                error!("Download unsuccessful: {e}");
                false
            }
        }
    }

    /// Same as [`fetch_if_stale`](Self::fetch_if_stale) but keeps the
    /// distinction between "up to date" and failure.
    pub fn check_and_download(&self) -> Result<FetchOutcome, FetchError> {
        let raw_dir = self.config.raw_dir();
        fs::create_dir_all(&raw_dir).map_err(FetchError::io(&raw_dir))?;

        let client = self.build_client().map_err(FetchError::Client)?;

        let staged = self.config.staged_manifest_path();
        let stored = self.config.manifest_path();
        self.fetch_manifest(&client, &staged)?;

        if checksum::same_content(&staged, &stored).map_err(FetchError::io(&staged))? {
            info!("BAN database is already up to date. No need to download it again.");
            fs::remove_file(&staged).map_err(FetchError::io(&staged))?;
            return Ok(FetchOutcome::UpToDate);
        }
        debug!("manifest {} differs from {}", staged.display(), stored.display());

        let archive = self.config.archive_path();
        if archive.exists() {
            debug!("removing stale archive {}", archive.display());
            fs::remove_file(&archive).map_err(FetchError::io(&archive))?;
        }

        let bytes = self.fetch_archive(&client, &archive)?;

        // The manifest is only recorded once its archive is known complete, so a
        // failed download is retried on the next run.
        fs::rename(&staged, &stored).map_err(FetchError::io(&stored))?;
        info!("downloaded {bytes} bytes to {}", archive.display());

        Ok(FetchOutcome::Downloaded { bytes })
    }

    /// Stream the remote manifest into `dest`.
    fn fetch_manifest(&self, client: &Client, dest: &Path) -> Result<u64, FetchError> {
        let url = &self.config.manifest_url;
        let mut resp = get(client, url)?;

        let mut file = File::create(dest).map_err(FetchError::io(dest))?;
        let written = resp.copy_to(&mut file).map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;
        debug!("fetched manifest ({written} bytes) into {}", dest.display());
        Ok(written)
    }

    /// Stream the archive into `dest`, reporting progress per chunk.
    ///
    /// On an incomplete transfer the partial file is left on disk.
    fn fetch_archive(&self, client: &Client, dest: &Path) -> Result<u64, FetchError> {
        let url = &self.config.archive_url;
        let mut resp = get(client, url)?;
        let total = resp
            .content_length()
            .ok_or_else(|| FetchError::MissingLength { url: url.clone() })?;

        let mut file = File::create(dest).map_err(FetchError::io(dest))?;
        let mut buf = [0u8; CHUNK_SIZE];
        let mut done: u64 = 0;

        loop {
            let n = resp.read(&mut buf).map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).map_err(FetchError::io(dest))?;
            done += n as u64;

            if let Some(progress) = self.progress.as_ref().filter(|_| total > 0) {
                progress(DOWNLOAD_LABEL, done as f64 / total as f64);
            }
        }
        file.flush().map_err(FetchError::io(dest))?;

        if done != total {
            return Err(FetchError::Incomplete {
                received: done,
                expected: total,
            });
        }
        Ok(done)
    }
}

/// Issue a GET and reject non-success statuses.
fn get(client: &Client, url: &str) -> Result<Response, FetchError> {
    let resp = client.get(url).send().map_err(|source| FetchError::Request {
        url: url.to_owned(),
        source,
    })?;
    if !resp.status().is_success() {
        return Err(FetchError::BadStatus {
            url: url.to_owned(),
            status: resp.status(),
        });
    }
    Ok(resp)
}

use std::path::PathBuf;

use log::info;

use crate::config::{proxy_from_env, FetchConfig};
use crate::downloader::{Downloader, FetchOutcome};
use crate::error::Error;
use crate::extract::Extractor;
use crate::progress::{default_progress_fn, ProgressFn};

/// What [`Api::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The stored manifest matched the remote one; nothing changed on disk.
    UpToDate,
    /// A fresh archive was downloaded and extracted.
    Updated { bytes: u64, members: usize },
    /// A fresh archive was downloaded; extraction was not requested.
    Downloaded { bytes: u64 },
}

/// Top-level entry-point with a chainable builder API.
///
/// # Example
/// ```rust,no_run
/// use banfetch::Api;
///
/// let status = Api::new()
///     .set_data_dir("./data")
///     .update()
///     .unwrap();
/// println!("{status:?}");
/// ```
pub struct Api {
    config: FetchConfig,
    progress: Option<ProgressFn>,
    extract: bool,
}

impl Api {
    /// Create an `Api` with the default configuration.
    ///
    /// Proxy is read from `HTTP_PROXY` / `HTTPS_PROXY` environment variables.
    pub fn new() -> Self {
        Self::with_config(FetchConfig {
            proxy: proxy_from_env(),
            ..FetchConfig::default()
        })
    }

    /// Create an `Api` around an explicit configuration, used as-is.
    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            config,
            progress: Some(default_progress_fn()),
            extract: true,
        }
    }

    /// Set the base data directory (builder).
    pub fn set_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the manifest URL (builder).
    pub fn set_manifest_url(mut self, url: &str) -> Self {
        self.config.manifest_url = url.to_owned();
        self
    }

    /// Set the archive URL (builder).
    pub fn set_archive_url(mut self, url: &str) -> Self {
        self.config.archive_url = url.to_owned();
        self
    }

    /// Set the directory archive members are extracted into (builder).
    pub fn set_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.extract_dir = Some(dir.into());
        self
    }

    /// Set an explicit HTTP/HTTPS proxy URL (builder).
    pub fn set_proxy(mut self, proxy: &str) -> Self {
        self.config.proxy = Some(proxy.to_owned());
        self
    }

    /// Override the progress callback (builder).
    pub fn set_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Disable progress output (builder).
    pub fn no_progress(mut self) -> Self {
        self.progress = None;
        self
    }

    /// Stop after the download stage (builder).
    pub fn skip_extract(mut self) -> Self {
        self.extract = false;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// A [`Downloader`] sharing this configuration and progress callback.
    pub fn downloader(&self) -> Downloader {
        Downloader::with_progress(self.config.clone(), self.progress.clone())
    }

    /// An [`Extractor`] sharing this configuration and progress callback.
    pub fn extractor(&self) -> Extractor {
        Extractor::from_config(&self.config, self.progress.clone())
    }

    /// Run the download stage, then extract when a fresh archive arrived.
    pub fn update(&self) -> Result<UpdateStatus, Error> {
        let bytes = match self.downloader().check_and_download()? {
            FetchOutcome::UpToDate => return Ok(UpdateStatus::UpToDate),
            FetchOutcome::Downloaded { bytes } => bytes,
        };

        if !self.extract {
            return Ok(UpdateStatus::Downloaded { bytes });
        }

        let members = self.extractor().try_extract()?;
        info!("BAN database updated ({bytes} bytes, {members} files)");
        Ok(UpdateStatus::Updated { bytes, members })
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn builder_updates_config() {
        let api = Api::with_config(FetchConfig::default())
            .set_data_dir("/srv/geo")
            .set_manifest_url("http://mirror.local/contenu.txt")
            .set_archive_url("http://mirror.local/ban.zip")
            .set_extract_dir("/srv/geo/extracted")
            .set_proxy("http://proxy.local:3128")
            .no_progress();

        let cfg = api.config();
        assert_eq!(cfg.data_dir, Path::new("/srv/geo"));
        assert_eq!(cfg.manifest_url, "http://mirror.local/contenu.txt");
        assert_eq!(cfg.archive_url, "http://mirror.local/ban.zip");
        assert_eq!(cfg.extract_dir(), Path::new("/srv/geo/extracted"));
        assert_eq!(cfg.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert!(api.downloader().progress.is_none());
        assert_eq!(api.extractor().target_dir, Path::new("/srv/geo/extracted"));
    }
}

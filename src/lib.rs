//! # banfetch
//!
//! Keeps a local copy of the French national address dataset (BAN) fresh.
//!
//! The update runs in two stages:
//!
//! 1. [`fetch_if_stale`] downloads a small manifest, compares its MD5 with the
//!    manifest stored by the last complete download, and streams the archive
//!    only when they differ.
//! 2. [`extract_archive`] tests the archive and expands every member into the
//!    extraction directory.
//!
//! Both report progress through an injectable [`ProgressFn`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use banfetch::{extract_archive, fetch_if_stale, default_progress_fn, FetchConfig};
//!
//! let config = FetchConfig::new("./data");
//! if fetch_if_stale(&config, Some(default_progress_fn())) {
//!     extract_archive(&config, Some(default_progress_fn()));
//! }
//! ```

pub mod api;
pub mod checksum;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod progress;

pub use api::{Api, UpdateStatus};
pub use config::FetchConfig;
pub use downloader::{Downloader, FetchOutcome};
pub use error::{ConfigError, Error, ExtractError, FetchError};
pub use extract::Extractor;
pub use progress::{default_progress_fn, render_progress, report_progress, ProgressFn};

/// Download a fresh archive when the remote manifest changed.
///
/// `true` means a complete archive was downloaded; `false` means the dataset
/// was already up to date or something failed (the reason is logged).
pub fn fetch_if_stale(config: &FetchConfig, progress: Option<ProgressFn>) -> bool {
    Downloader::with_progress(config.clone(), progress).fetch_if_stale()
}

/// Extract the downloaded archive into the configured extraction directory.
pub fn extract_archive(config: &FetchConfig, progress: Option<ProgressFn>) -> bool {
    Extractor::from_config(config, progress).extract_archive()
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MANIFEST_URL: &str = "https://adresse.data.gouv.fr/data/contenu.txt";
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://adresse.data.gouv.fr/data/BAN_licence_gratuite_repartage.zip";

/// Locations and endpoints used by both stages.
///
/// Layout on disk:
///
/// ```text
/// <data_dir>/
///     <staged_manifest_name>      manifest being checked
///     <raw_dir_name>/
///         <manifest_file_name>    last manifest whose archive was fully fetched
///         <archive_file_name>
/// ```
///
/// Missing fields take their default when deserialized, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Raw-data subdirectory holding the manifest and the archive.
    pub raw_dir_name: String,
    pub manifest_url: String,
    pub archive_url: String,
    pub manifest_file_name: String,
    pub staged_manifest_name: String,
    pub archive_file_name: String,
    /// Where archive members go. Defaults to the raw-data directory.
    pub extract_dir: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout. Unset by default since the archive is large.
    pub request_timeout_secs: Option<u64>,
    /// Optional HTTP proxy URL.
    pub proxy: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            raw_dir_name: "raw".to_owned(),
            manifest_url: DEFAULT_MANIFEST_URL.to_owned(),
            archive_url: DEFAULT_ARCHIVE_URL.to_owned(),
            manifest_file_name: "contenu.txt".to_owned(),
            staged_manifest_name: "new_content.txt".to_owned(),
            archive_file_name: "ban.zip".to_owned(),
            extract_dir: None,
            connect_timeout_secs: 30,
            request_timeout_secs: None,
            proxy: None,
        }
    }
}

impl FetchConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join(&self.raw_dir_name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.raw_dir().join(&self.manifest_file_name)
    }

    pub fn staged_manifest_path(&self) -> PathBuf {
        self.data_dir.join(&self.staged_manifest_name)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.raw_dir().join(&self.archive_file_name)
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.extract_dir.clone().unwrap_or_else(|| self.raw_dir())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Proxy from `HTTP_PROXY`, then `HTTPS_PROXY`; empty values are ignored.
pub fn proxy_from_env() -> Option<String> {
    std::env::var("HTTP_PROXY")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HTTPS_PROXY").ok().filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_follow_layout() {
        let cfg = FetchConfig::new("/srv/geo");
        assert_eq!(cfg.raw_dir(), Path::new("/srv/geo/raw"));
        assert_eq!(cfg.manifest_path(), Path::new("/srv/geo/raw/contenu.txt"));
        assert_eq!(cfg.staged_manifest_path(), Path::new("/srv/geo/new_content.txt"));
        assert_eq!(cfg.archive_path(), Path::new("/srv/geo/raw/ban.zip"));
        assert_eq!(cfg.extract_dir(), Path::new("/srv/geo/raw"));
    }

    #[test]
    fn default_layout_is_under_dot_data() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.data_dir, Path::new("./data"));
        assert_eq!(cfg.archive_path(), Path::new("./data/raw/ban.zip"));
    }

    #[test]
    fn staged_manifest_is_outside_raw_dir() {
        let cfg = FetchConfig::new("base");
        assert!(!cfg.staged_manifest_path().starts_with(cfg.raw_dir()));
    }

    #[test]
    fn explicit_extract_dir_wins() {
        let cfg = FetchConfig {
            extract_dir: Some(PathBuf::from("/tmp/out")),
            ..FetchConfig::new("base")
        };
        assert_eq!(cfg.extract_dir(), Path::new("/tmp/out"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banfetch.json");
        std::fs::write(
            &path,
            r#"{ "data_dir": "/var/lib/ban", "archive_url": "http://mirror.local/ban.zip" }"#,
        )
        .unwrap();

        let cfg = FetchConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.data_dir, Path::new("/var/lib/ban"));
        assert_eq!(cfg.archive_url, "http://mirror.local/ban.zip");
        assert_eq!(cfg.manifest_url, DEFAULT_MANIFEST_URL);
        assert_eq!(cfg.archive_file_name, "ban.zip");
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn unreadable_or_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            FetchConfig::from_json_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            FetchConfig::from_json_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }
}

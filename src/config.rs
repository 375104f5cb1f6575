//! Configuration file handling.
//!
//! The configuration lives in a YAML file next to where the tool runs. When
//! the file does not exist yet it is created with defaults, so a first run
//! leaves behind something to edit:
//!
//! ```yaml
//! api_key: ''
//! sources:
//! - bbc-news
//! - daily-mail
//! - cnn
//! - mirror
//! sort_mode: top
//! store_dir: store
//! archive_root: Archive
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::{NewsError, Result};
use crate::models::{SortMode, validate_source_id};

pub const DEFAULT_CONFIG_FILE: &str = "newsfeed.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// News API key. Empty means requests go out unauthorized and fail.
    pub api_key: String,
    /// Sources collected when no category is chosen.
    pub sources: Vec<String>,
    pub sort_mode: SortMode,
    /// Directory holding the per-source JSON collections.
    pub store_dir: PathBuf,
    /// Root under which dated snapshot directories are created.
    pub archive_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sources: ["bbc-news", "daily-mail", "cnn", "mirror"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sort_mode: SortMode::Top,
            store_dir: PathBuf::from("store"),
            archive_root: PathBuf::from("Archive"),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Every configured source must be a plain source ID.
    pub fn validate(&self) -> Result<()> {
        self.sources
            .iter()
            .try_for_each(|source| validate_source_id(source))
    }
}

/// Load the configuration at `path`, writing the defaults there first if the
/// file is missing.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_or_create(path: &Path) -> Result<Config> {
    let config = match fs::read_to_string(path).await {
        Ok(raw) => {
            let config = Config::from_yaml(&raw)
                .and_then(|config| config.validate().map(|()| config))
                .map_err(|e| NewsError::Config(format!("{}: {e}", path.display())))?;
            info!(sources = config.sources.len(), "Configuration file loaded");
            config
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let config = Config::default();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(path, config.to_yaml()?).await?;
            info!("Configuration file created");
            config
        }
        Err(e) => return Err(e.into()),
    };

    if !config.has_api_key() {
        warn!("API key missing; requests cannot be made to News API without one");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("conf").join(DEFAULT_CONFIG_FILE);

        let config = load_or_create(&path).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(path.is_file());
        assert_eq!(load_or_create(&path).await.unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("api_key: abc123\nsort_mode: latest\n").unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.sort_mode, SortMode::Latest);
        assert_eq!(config.sources, Config::default().sources);
        assert!(config.has_api_key());
    }

    #[test]
    fn test_sources_list() {
        let config = Config::from_yaml("sources: [cnn, the-verge]").unwrap();
        assert_eq!(config.sources, vec!["cnn", "the-verge"]);
        assert!(!config.has_api_key());
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "sort_mode: sideways\n").unwrap();
        assert!(matches!(
            load_or_create(&path).await,
            Err(NewsError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_path_like_source_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "sources: [cnn, ../../etc]\n").unwrap();

        let err = load_or_create(&path).await.unwrap_err();
        assert!(matches!(&err, NewsError::Config(msg) if msg.contains("../../etc")));
    }
}

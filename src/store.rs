//! File-backed storage of article collections.
//!
//! One JSON file per [`SourceKey`], named `<source>-<sort>.json`, holding the
//! full ordered array of [`ArticleRecord`]s. A write replaces the previous
//! collection wholesale.
//!
//! # Layout
//!
//! ```text
//! store_dir/
//! ├── bbc-news-top.json
//! ├── bbc-news-latest.json
//! └── cnn-top.json
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::{NewsError, Result};
use crate::models::{ArticleRecord, SortMode, SourceKey};

/// Records gathered from several collections, plus the ones that were skipped.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<ArticleRecord>,
    /// Store keys that had no readable collection.
    pub skipped: Vec<SourceKey>,
}

impl LoadedRecords {
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &SourceKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Persist `records` under `key`, replacing whatever was there.
    #[instrument(level = "debug", skip_all, fields(%key, count = records.len()))]
    pub async fn write(&self, key: &SourceKey, records: &[ArticleRecord]) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(records)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| NewsError::storage(&self.root, e))?;
        fs::write(&path, json)
            .await
            .map_err(|e| NewsError::storage(&path, e))?;

        debug!(path = %path.display(), "Wrote collection");
        Ok(())
    }

    /// Read the collection stored under `key`.
    ///
    /// # Errors
    ///
    /// [`NewsError::NotFound`] when no file exists for the key (an empty
    /// collection is `Ok(vec![])`), [`NewsError::Storage`] when the file is
    /// unreadable or not a record array.
    #[instrument(level = "debug", skip_all, fields(%key))]
    pub async fn read(&self, key: &SourceKey) -> Result<Vec<ArticleRecord>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(NewsError::NotFound(key.clone()));
            }
            Err(e) => return Err(NewsError::storage(&path, e)),
        };
        serde_json::from_str(&raw).map_err(|e| NewsError::storage(&path, e))
    }

    /// Read every source's collection in order, skipping unreadable ones.
    ///
    /// A missing or corrupt collection never fails the whole load.
    #[instrument(level = "info", skip_all, fields(sources = sources.len(), %sort_mode))]
    pub async fn load(&self, sources: &[String], sort_mode: SortMode) -> LoadedRecords {
        let mut loaded = LoadedRecords::default();
        for source in sources {
            let key = SourceKey::new(source.as_str(), sort_mode);
            match self.read(&key).await {
                Ok(records) => {
                    debug!(%key, count = records.len(), "Loaded collection");
                    loaded.records.extend(records);
                }
                Err(NewsError::NotFound(_)) => {
                    warn!(%key, "Could not find collection; skipping source");
                    loaded.skipped.push(key);
                }
                Err(e) => {
                    warn!(%key, error = %e, "Could not read collection; skipping source");
                    loaded.skipped.push(key);
                }
            }
        }
        info!(
            records = loaded.records.len(),
            skipped = loaded.skipped.len(),
            "Loaded stored articles"
        );
        loaded
    }
}

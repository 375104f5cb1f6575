//! Data models for articles as the API returns them and as they are stored.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`RawArticle`] / [`ApiResponse`]: the JSON shapes News API answers with
//! - [`ArticleRecord`]: the normalized record persisted in the local store
//! - [`SortMode`] and [`SourceKey`]: what identifies one stored collection
//!
//! Stored records keep the capitalized field names (`ID`, `Title`, ...) of the
//! on-disk format, so collections written by older builds still load.

use std::fmt;

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};

use crate::error::{NewsError, Result};

/// Length of a generated article identifier.
pub const ARTICLE_ID_LEN: usize = 10;

/// Which News API listing to collect from.
///
/// The mode changes both the request shape and the store key, so `top` and
/// `latest` collections for the same source live side by side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Top headlines.
    #[default]
    Top,
    /// Most recent articles, unranked.
    Latest,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Top => "top",
            SortMode::Latest => "latest",
        }
    }

    /// News API v2 endpoint name for this mode.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SortMode::Top => "top-headlines",
            SortMode::Latest => "everything",
        }
    }

    /// Capitalized label used in status messages ("Collecting Top Articles...").
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Top => "Top",
            SortMode::Latest => "Latest",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies exactly one persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub source_id: String,
    pub sort_mode: SortMode,
}

impl SourceKey {
    pub fn new(source_id: impl Into<String>, sort_mode: SortMode) -> Self {
        Self {
            source_id: source_id.into(),
            sort_mode,
        }
    }

    /// File name of this collection inside the store directory.
    ///
    /// Characters outside the source-ID alphabet become `_`, so the name
    /// never leaves the store directory.
    pub fn file_name(&self) -> String {
        let id: String = self
            .source_id
            .chars()
            .map(|c| if is_source_id_char(c) { c } else { '_' })
            .collect();
        format!("{id}-{}.json", self.sort_mode)
    }
}

fn is_source_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Source IDs are News API slugs such as `bbc-news`: ASCII letters, digits,
/// `-`, `_`, and `.`, not starting with `.`.
pub fn validate_source_id(source_id: &str) -> Result<()> {
    if source_id.is_empty()
        || source_id.starts_with('.')
        || !source_id.chars().all(is_source_id_char)
    {
        return Err(NewsError::InvalidSource(source_id.to_string()));
    }
    Ok(())
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source_id, self.sort_mode)
    }
}

/// One article as returned inside a News API response.
///
/// Every field is nullable upstream.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawArticle {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publishedAt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Top-level News API response body.
///
/// Errors come back as `{"status": "error", "code": ..., "message": ...}`
/// with no `articles` array.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Option<Vec<RawArticle>>,
}

/// A normalized article as kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Published")]
    pub published_at: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl ArticleRecord {
    /// Normalize one raw API article, assigning it a fresh identifier.
    pub fn from_raw(raw: RawArticle) -> Self {
        Self {
            id: generate_article_id(),
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            author: raw.author,
            published_at: raw.publishedAt.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }

    /// Case-sensitive literal match against title or description.
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.contains(needle))
    }
}

/// Generate a random 10-character alphanumeric article ID.
///
/// IDs are not checked against existing records; with 62^10 possibilities a
/// collision inside one collection is not a practical concern.
pub fn generate_article_id() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(ARTICLE_ID_LEN)
        .map(char::from)
        .collect()
}

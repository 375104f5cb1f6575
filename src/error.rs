//! Error taxonomy for the ingestion, filtering, and archival pipeline.
//!
//! Per-item failures (one source, one article) are caught inside the loops
//! that produce them and only ever logged. The variants here are what crosses
//! a function boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::SourceKey;
use crate::runner::{OperationKind, RunState, Transition};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NewsError>;

#[derive(Debug, Error)]
pub enum NewsError {
    /// The API endpoint could not be reached at all.
    #[error("could not connect to {endpoint}: {reason}")]
    Connectivity { endpoint: String, reason: String },

    /// One source's request or response handling failed.
    #[error("data not collected for '{source_id}': {reason}")]
    SourceFetch { source_id: String, reason: String },

    #[error("storage failure at {}: {reason}", .path.display())]
    Storage { path: PathBuf, reason: String },

    #[error("no collection stored for {0}")]
    NotFound(SourceKey),

    #[error("filter '{0}' contains no searchable characters")]
    Validation(String),

    #[error("a {0} operation is already running")]
    Busy(OperationKind),

    #[error("cannot apply {transition:?} while {from:?}")]
    InvalidTransition { from: RunState, transition: Transition },

    #[error("invalid source id '{0}'")]
    InvalidSource(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl NewsError {
    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        NewsError::Storage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn source_fetch(source_id: &str, reason: impl ToString) -> Self {
        NewsError::SourceFetch {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

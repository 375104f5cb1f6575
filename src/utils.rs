//! Helpers for log formatting, file naming, and directory checks.
//!
//! - Date stamps for archive directories
//! - Title to file-name conversion for archived pages
//! - String truncation for logging response bodies
//! - File system validation for output directories

use std::fs as stdfs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::{NewsError, Result};

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("static regex"));

/// Name of the archive directory for a given day, e.g. `8Oct2026`.
///
/// Day is unpadded, month is the abbreviated English name.
pub fn archive_dir_name(date: NaiveDate) -> String {
    format!("{}{}{}", date.day(), date.format("%b"), date.year())
}

/// Longest file-name stem written, in bytes; leaves room for an ID suffix
/// and the extension under the usual 255-byte limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Stem of the archived page's file name.
///
/// Characters that would escape the archive directory or are rejected by
/// common file systems become `_`, and long titles are cut at a char
/// boundary. Blank titles fall back to `fallback` (the article ID).
pub fn title_stem(title: &str, fallback: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(title.trim(), "_");
    let mut cut = cleaned.len().min(MAX_STEM_BYTES);
    while !cleaned.is_char_boundary(cut) {
        cut -= 1;
    }
    let stem = cleaned[..cut].trim().trim_matches('.');
    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// File name for an archived page: `<title>.html`.
pub fn title_to_file_name(title: &str, fallback: &str) -> String {
    format!("{}.html", title_stem(title, fallback))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with
/// an ellipsis and byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
///
/// # Errors
///
/// Returns [`NewsError::Storage`] if the directory cannot be created or
/// written to.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| NewsError::storage(path, e))?;
    // Sync probe keeps the error surface simple
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            debug!("Directory is writable");
            Ok(())
        }
        Err(e) => {
            info!(error = %e, "Directory is not writable");
            Err(NewsError::storage(path, e))
        }
    }
}

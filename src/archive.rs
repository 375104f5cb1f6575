//! Offline snapshots of selected articles.
//!
//! Each run writes into one dated directory under the archive root:
//!
//! ```text
//! archive_root/
//! └── 8Oct2026/
//!     ├── Markets rally on Friday.html
//!     └── Storm hits coast.html
//! ```
//!
//! Every selected record that resolves to a stored article costs one progress
//! step whether or not its page could be saved; the run always ends at 100.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::api::PageFetcher;
use crate::error::{NewsError, Result};
use crate::events::{Observer, Progress};
use crate::models::{ArticleRecord, SortMode};
use crate::store::LocalStore;
use crate::utils::{archive_dir_name, ensure_writable_dir, title_stem, title_to_file_name};

pub const SAVING_STATUS: &str = "Saving Articles Offline...";

/// Inputs of one archive run, captured when the run starts.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub sources: Vec<String>,
    pub sort_mode: SortMode,
    pub archive_root: PathBuf,
    pub date: NaiveDate,
    pub selected: HashSet<String>,
}

impl ArchiveRequest {
    pub fn directory(&self) -> PathBuf {
        self.archive_root.join(archive_dir_name(self.date))
    }
}

#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// `None` when the run ended before creating it (empty selection).
    pub directory: Option<PathBuf>,
    pub saved: Vec<PathBuf>,
    /// IDs whose page could not be fetched or written.
    pub failed: Vec<String>,
    /// Selected IDs that matched no stored record.
    pub unresolved: usize,
}

/// Fetch and store the full page of every selected article.
///
/// # Errors
///
/// Only a dated directory that cannot be created fails the run; per-article
/// failures are logged and counted in the report.
#[instrument(
    level = "info",
    skip_all,
    fields(selected = request.selected.len(), sort_mode = %request.sort_mode)
)]
pub async fn archive_selection<P: PageFetcher>(
    pages: &P,
    store: &LocalStore,
    request: &ArchiveRequest,
    observer: &dyn Observer,
) -> Result<ArchiveReport> {
    let mut report = ArchiveReport::default();
    if request.selected.is_empty() {
        warn!("No articles selected; nothing to save");
        observer.on_no_articles();
        return Ok(report);
    }
    info!(count = request.selected.len(), "Preparing to save articles");

    if let Err(e) = pages.check_connection().await {
        warn!(error = %e, "No connection; attempting pages anyway");
        observer.on_no_connection();
    }
    observer.on_status(SAVING_STATUS);

    let dir = request.directory();
    ensure_writable_dir(&dir).await?;
    report.directory = Some(dir.clone());

    let loaded = store.load(&request.sources, request.sort_mode).await;
    let mut progress = Progress::new(request.selected.len());
    let mut attempted: HashSet<&str> = HashSet::new();
    let mut taken: HashSet<PathBuf> = HashSet::new();

    for record in &loaded.records {
        if !request.selected.contains(&record.id) || !attempted.insert(record.id.as_str()) {
            continue;
        }
        debug!(id = %record.id, "Saving article");
        let saved = save_page(pages, &dir, record, &taken).await;
        let percent = progress.advance();
        observer.on_progress(percent);
        match saved {
            Ok(path) => {
                info!(id = %record.id, path = %path.display(), percent, "Article saved offline");
                taken.insert(path.clone());
                report.saved.push(path);
            }
            Err(e) => {
                error!(
                    id = %record.id,
                    title = %record.title,
                    error = %e,
                    percent,
                    "Could not save article"
                );
                report.failed.push(record.id.clone());
            }
        }
    }

    report.unresolved = request.selected.len() - attempted.len();
    if progress.completed() < progress.total() {
        debug!(unresolved = report.unresolved, "Some selected articles are no longer stored");
        observer.on_progress(progress.finish());
    }

    info!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        unresolved = report.unresolved,
        directory = %dir.display(),
        "Archive run complete"
    );
    Ok(report)
}

/// Fetch one page and write it under the title's file name, or
/// `<title>-<id>.html` when this run already wrote that name.
async fn save_page<P: PageFetcher>(
    pages: &P,
    dir: &Path,
    record: &ArticleRecord,
    taken: &HashSet<PathBuf>,
) -> Result<PathBuf> {
    let body = pages.fetch_page(&record.url).await?;
    let mut path = dir.join(title_to_file_name(&record.title, &record.id));
    if taken.contains(&path) {
        let stem = title_stem(&record.title, &record.id);
        warn!(
            id = %record.id,
            path = %path.display(),
            "Title already saved in this run; adding ID"
        );
        path = dir.join(format!("{stem}-{}.html", record.id));
    }
    fs::write(&path, body)
        .await
        .map_err(|e| NewsError::storage(&path, e))?;
    Ok(path)
}

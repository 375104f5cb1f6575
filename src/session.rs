//! The context every pipeline operation runs against.
//!
//! A [`Session`] owns what the operations share: the configured sources and
//! sort mode, the API key, the store, the archive root, the selection, the
//! observer, and the background [`Runner`]. Display, refresh, and filter run
//! on the caller's task; fetch and archive are spawned and may be cancelled.
//! Settings can only change while nothing runs in the background.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, instrument};

use crate::api::{NewsApi, PageFetcher};
use crate::archive::{ArchiveRequest, archive_selection};
use crate::catalog;
use crate::config::Config;
use crate::error::{NewsError, Result};
use crate::events::Observer;
use crate::fetch::{FetchRequest, collect_sources, publish_report};
use crate::filter::{FilterOutcome, filter_articles};
use crate::models::{ArticleRecord, SortMode, validate_source_id};
use crate::runner::{OperationKind, RunObserver, RunState, Runner};
use crate::selection::Selection;
use crate::store::{LoadedRecords, LocalStore};

pub struct Session {
    api_key: String,
    default_sources: Vec<String>,
    sources: Vec<String>,
    sort_mode: SortMode,
    store: LocalStore,
    archive_root: PathBuf,
    selection: Selection,
    observer: Arc<dyn Observer>,
    runner: Runner,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("sources", &self.sources)
            .field("sort_mode", &self.sort_mode)
            .field("store", &self.store)
            .field("archive_root", &self.archive_root)
            .field("selected", &self.selection.len())
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: &Config, observer: Arc<dyn Observer>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            default_sources: config.sources.clone(),
            sources: config.sources.clone(),
            sort_mode: config.sort_mode,
            store: LocalStore::new(&config.store_dir),
            archive_root: config.archive_root.clone(),
            selection: Selection::default(),
            runner: Runner::new(Arc::clone(&observer)),
            observer,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> RunState {
        self.runner.state()
    }

    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.runner.state() {
            RunState::Running(kind) => Err(NewsError::Busy(kind)),
            _ => Ok(()),
        }
    }

    pub fn set_sources(&mut self, sources: Vec<String>) -> Result<()> {
        self.ensure_idle()?;
        for source in &sources {
            validate_source_id(source)?;
        }
        self.sources = sources;
        Ok(())
    }

    pub fn set_sort_mode(&mut self, sort_mode: SortMode) -> Result<()> {
        self.ensure_idle()?;
        self.sort_mode = sort_mode;
        info!(%sort_mode, "Sort mode selected");
        Ok(())
    }

    /// Switch sources to a catalog category; `Default` restores the
    /// configured list.
    pub fn select_category(&mut self, label: &str) -> Result<()> {
        let sources = if label.trim().eq_ignore_ascii_case(catalog::DEFAULT) {
            self.default_sources.clone()
        } else {
            catalog::sources_for(label)
                .ok_or_else(|| NewsError::UnknownCategory(label.to_string()))?
        };
        self.set_sources(sources)?;
        info!(category = label, sources = self.sources.len(), "Category selected");
        Ok(())
    }

    pub fn set_store_dir(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        self.ensure_idle()?;
        self.store = LocalStore::new(dir);
        Ok(())
    }

    /// Reload every configured source from the store, select all of it, and
    /// hand it to the observer.
    #[instrument(level = "info", skip(self))]
    pub async fn refresh(&self) -> LoadedRecords {
        let loaded = self.store.load(&self.sources, self.sort_mode).await;
        self.selection.reset(loaded.ids());
        self.observer.on_articles_ready(&loaded.records);
        loaded
    }

    /// Point the store at `dir` and refresh from it.
    pub async fn load_from(&mut self, dir: &Path) -> Result<LoadedRecords> {
        self.set_store_dir(dir)?;
        info!(dir = %dir.display(), "Loading articles");
        Ok(self.refresh().await)
    }

    /// Stored records that are currently selected, in store order.
    pub async fn selected_records(&self) -> Vec<ArticleRecord> {
        let selected = self.selection.selected();
        self.store
            .load(&self.sources, self.sort_mode)
            .await
            .records
            .into_iter()
            .filter(|r| selected.contains(&r.id))
            .collect()
    }

    pub async fn filter(&self, term: &str) -> Result<FilterOutcome> {
        filter_articles(
            &self.store,
            &self.sources,
            self.sort_mode,
            term,
            &self.selection,
            &*self.observer,
        )
        .await
    }

    /// Start collecting every configured source in the background.
    ///
    /// The selection is only replaced if the run is still current when the
    /// collection finishes.
    pub fn start_fetch<A>(&mut self, api: Arc<A>) -> Result<()>
    where
        A: NewsApi + 'static,
    {
        let request = FetchRequest {
            sources: self.sources.clone(),
            sort_mode: self.sort_mode,
            api_key: self.api_key.clone(),
        };
        let store = self.store.clone();
        let selection = self.selection.clone();
        let observer = Arc::clone(&self.observer);

        self.runner.spawn(OperationKind::Fetch, move |ticket| async move {
            let run_observer = RunObserver::new(ticket.clone(), Arc::clone(&observer));
            let report = collect_sources(&*api, &store, &request, &run_observer).await;
            if ticket
                .if_current(|| publish_report(&report, &selection, &*observer))
                .is_none()
            {
                info!("Fetch cancelled; selection left unchanged");
            }
            Ok(())
        })
    }

    /// Start archiving the current selection in the background.
    pub fn start_archive<P>(&mut self, pages: Arc<P>) -> Result<()>
    where
        P: PageFetcher + 'static,
    {
        let request = ArchiveRequest {
            sources: self.sources.clone(),
            sort_mode: self.sort_mode,
            archive_root: self.archive_root.clone(),
            date: Local::now().date_naive(),
            selected: self.selection.selected(),
        };
        let store = self.store.clone();
        let observer = Arc::clone(&self.observer);

        self.runner.spawn(OperationKind::Archive, move |ticket| async move {
            let run_observer = RunObserver::new(ticket, observer);
            archive_selection(&*pages, &store, &request, &run_observer).await?;
            Ok(())
        })
    }

    /// The single cancel/reset control.
    pub fn cancel(&mut self) -> RunState {
        self.runner.cancel()
    }

    pub async fn wait(&mut self) -> Option<RunState> {
        self.runner.wait().await
    }
}

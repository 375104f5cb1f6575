//! Fetch orchestration: one listing request per configured source.
//!
//! Sources are processed sequentially in the order given. A source that fails
//! for any reason (network, HTTP status, malformed body, missing `articles`,
//! unwritable store) is logged and skipped; it never aborts the run. Progress
//! advances one fixed step per source whatever the outcome, so a run always
//! ends at 100.

use tracing::{error, info, instrument, warn};

use crate::api::NewsApi;
use crate::error::Result;
use crate::events::{Observer, Progress};
use crate::models::{ArticleRecord, SortMode, SourceKey};
use crate::selection::Selection;
use crate::store::LocalStore;

/// Inputs of one fetch run, captured when the run starts.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub sources: Vec<String>,
    pub sort_mode: SortMode,
    pub api_key: String,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Every record written during the run, in source order.
    pub records: Vec<ArticleRecord>,
}

impl FetchReport {
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// Status line shown while a fetch runs, e.g. `Collecting Top Articles...`.
pub fn collecting_status(sort_mode: SortMode) -> String {
    format!("Collecting {} Articles...", sort_mode.label())
}

/// Collect every source into the store and make the result the selection.
///
/// A failed connectivity probe or an empty API key is reported to the
/// observer, but the per-source requests are attempted regardless.
pub async fn fetch_sources<A: NewsApi>(
    api: &A,
    store: &LocalStore,
    request: &FetchRequest,
    selection: &Selection,
    observer: &dyn Observer,
) -> FetchReport {
    let report = collect_sources(api, store, request, observer).await;
    publish_report(&report, selection, observer);
    report
}

/// The store-writing half of [`fetch_sources`]: everything except touching
/// the selection.
#[instrument(
    level = "info",
    skip_all,
    fields(sources = request.sources.len(), sort_mode = %request.sort_mode)
)]
pub async fn collect_sources<A: NewsApi>(
    api: &A,
    store: &LocalStore,
    request: &FetchRequest,
    observer: &dyn Observer,
) -> FetchReport {
    if request.api_key.trim().is_empty() {
        warn!("API key missing; requests cannot be authorized");
        observer.on_missing_api_key();
    }

    match api.check_connection().await {
        Ok(()) => info!("Connected to News API"),
        Err(e) => {
            warn!(error = %e, "No connection to News API; attempting sources anyway");
            observer.on_no_connection();
        }
    }

    observer.on_status(&collecting_status(request.sort_mode));
    info!(count = request.sources.len(), "Collecting news articles");

    let mut report = FetchReport::default();
    let mut progress = Progress::new(request.sources.len());

    for source in &request.sources {
        let key = SourceKey::new(source.as_str(), request.sort_mode);
        match collect_source(api, store, &key, &request.api_key).await {
            Ok(records) => {
                info!(%key, count = records.len(), "Collection saved");
                report.succeeded.push(source.clone());
                report.records.extend(records);
            }
            Err(e) => {
                error!(%key, error = %e, "Data not collected; skipping source");
                report.failed.push(source.clone());
            }
        }
        let percent = progress.advance();
        observer.on_progress(percent);
        info!(%key, percent, "Source finished");
    }

    if progress.total() == 0 {
        observer.on_progress(progress.finish());
    }

    info!(
        articles = report.records.len(),
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Articles collected"
    );
    report
}

/// Select everything a fetch collected and hand it to the observer.
pub fn publish_report(report: &FetchReport, selection: &Selection, observer: &dyn Observer) {
    selection.reset(report.ids());
    observer.on_articles_ready(&report.records);
}

async fn collect_source<A: NewsApi>(
    api: &A,
    store: &LocalStore,
    key: &SourceKey,
    api_key: &str,
) -> Result<Vec<ArticleRecord>> {
    let raw = api
        .fetch_articles(&key.source_id, key.sort_mode, api_key)
        .await?;
    let records: Vec<ArticleRecord> = raw.into_iter().map(ArticleRecord::from_raw).collect();
    store.write(key, &records).await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelObserver, Event};
    use crate::testing::{FakeNewsApi, raw};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn progress_of(events: &[Event]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn request(sources: &[&str]) -> FetchRequest {
        FetchRequest {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            sort_mode: SortMode::Top,
            api_key: "k3y".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_writes_each_source_and_selects_all() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let api = FakeNewsApi::new()
            .with_listing(
                "bbc-news",
                vec![
                    raw("One", Some("first"), "https://bbc.co.uk/1"),
                    raw("Two", None, "https://bbc.co.uk/2"),
                ],
            )
            .with_listing("cnn", vec![raw("Three", Some("third"), "https://cnn.com/3")]);
        let selection = Selection::default();
        let (observer, mut rx) = ChannelObserver::new();

        let report = fetch_sources(
            &api,
            &store,
            &request(&["bbc-news", "cnn"]),
            &selection,
            &observer,
        )
        .await;

        assert_eq!(report.succeeded, vec!["bbc-news", "cnn"]);
        assert_eq!(report.records.len(), 3);
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.known(), report.ids());

        let stored = store.read(&SourceKey::new("bbc-news", SortMode::Top)).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].title, "One");

        let events = drain(&mut rx);
        assert_eq!(progress_of(&events), vec![50, 100]);
        assert!(events.contains(&Event::Status("Collecting Top Articles...".to_string())));
        assert!(matches!(events.last(), Some(Event::ArticlesReady(r)) if r.len() == 3));
        assert_eq!(api.calls()[0], ("bbc-news".to_string(), SortMode::Top, "k3y".to_string()));
    }

    #[tokio::test]
    async fn test_failed_sources_are_skipped_and_progress_completes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let api =
            FakeNewsApi::new().with_listing("cnn", vec![raw("Only", None, "https://cnn.com/o")]);
        let selection = Selection::default();
        let (observer, mut rx) = ChannelObserver::new();

        let report = fetch_sources(
            &api,
            &store,
            &request(&["bbc-news", "cnn", "mirror"]),
            &selection,
            &observer,
        )
        .await;

        assert_eq!(report.failed, vec!["bbc-news", "mirror"]);
        assert_eq!(report.succeeded, vec!["cnn"]);
        assert_eq!(selection.len(), 1);
        assert!(matches!(
            store.read(&SourceKey::new("bbc-news", SortMode::Top)).await,
            Err(crate::error::NewsError::NotFound(_))
        ));
        assert_eq!(progress_of(&drain(&mut rx)), vec![33, 66, 100]);
    }

    #[tokio::test]
    async fn test_every_source_failing_still_reaches_100() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let api = FakeNewsApi::new().offline();
        let selection = Selection::default();
        selection.reset(vec!["stale".to_string()]);
        let (observer, mut rx) = ChannelObserver::new();

        let sources = ["a", "b", "c", "d", "e", "f", "g"];
        let report = fetch_sources(&api, &store, &request(&sources), &selection, &observer).await;

        assert_eq!(report.failed.len(), 7);
        assert!(selection.is_empty());
        let events = drain(&mut rx);
        assert!(events.contains(&Event::NoConnection));
        assert_eq!(progress_of(&events).last(), Some(&100));
        assert_eq!(api.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported_but_attempted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let api = FakeNewsApi::new();
        let (observer, mut rx) = ChannelObserver::new();
        let mut req = request(&["cnn"]);
        req.api_key = String::new();

        fetch_sources(&api, &store, &req, &Selection::default(), &observer).await;

        assert_eq!(drain(&mut rx)[0], Event::MissingApiKey);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_listing_is_a_valid_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let api = FakeNewsApi::new().with_listing("cnn", vec![]);
        let report = fetch_sources(
            &api,
            &store,
            &request(&["cnn"]),
            &Selection::default(),
            &crate::events::NullObserver,
        )
        .await;

        assert_eq!(report.succeeded, vec!["cnn"]);
        assert!(store.read(&SourceKey::new("cnn", SortMode::Top)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_sources_reports_100() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let (observer, mut rx) = ChannelObserver::new();
        fetch_sources(
            &FakeNewsApi::new(),
            &store,
            &request(&[]),
            &Selection::default(),
            &observer,
        )
        .await;
        assert_eq!(progress_of(&drain(&mut rx)), vec![100]);
    }
}

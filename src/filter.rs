//! Keyword filtering over the locally stored collections.
//!
//! Matching is a case-sensitive literal substring test against title and
//! description. No network access; the result replaces the selection.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::error::{NewsError, Result};
use crate::events::Observer;
use crate::models::{ArticleRecord, SortMode, SourceKey};
use crate::selection::Selection;
use crate::store::LocalStore;

/// Punctuation accepted in a filter term alongside ASCII letters and digits.
pub const SEARCH_PUNCTUATION: &[char] = &[
    '-', '!', '?', ':', ';', '@', ',', '.', '#', '/', '>', '<', '(', ')', '[', ']',
];

#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Matching records in store order, each once.
    pub matches: Vec<ArticleRecord>,
    pub skipped: Vec<SourceKey>,
}

impl FilterOutcome {
    pub fn ids(&self) -> HashSet<String> {
        self.matches.iter().map(|r| r.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

pub fn is_search_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SEARCH_PUNCTUATION.contains(&c)
}

/// A term is searchable when at least one of its characters is.
pub fn validate_term(term: &str) -> Result<()> {
    if term.chars().any(is_search_char) {
        Ok(())
    } else {
        Err(NewsError::Validation(term.to_string()))
    }
}

/// Records mentioning `term`, de-duplicated by ID, order preserved.
pub fn matching_records<'a>(
    records: impl IntoIterator<Item = &'a ArticleRecord>,
    term: &str,
) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .filter(|r| r.mentions(term))
        .unique_by(|r| r.id.clone())
        .cloned()
        .collect()
}

/// Scan every source's collection for `term` and select the matches.
///
/// # Errors
///
/// [`NewsError::Validation`] when the term has no searchable character; the
/// store and selection are left untouched in that case.
#[instrument(
    level = "info",
    skip(store, sources, selection, observer),
    fields(sources = sources.len())
)]
pub async fn filter_articles(
    store: &LocalStore,
    sources: &[String],
    sort_mode: SortMode,
    term: &str,
    selection: &Selection,
    observer: &dyn Observer,
) -> Result<FilterOutcome> {
    if let Err(e) = validate_term(term) {
        warn!(error = %e, "Invalid filter string");
        return Err(e);
    }

    let loaded = store.load(sources, sort_mode).await;
    let outcome = FilterOutcome {
        matches: matching_records(&loaded.records, term),
        skipped: loaded.skipped,
    };

    selection.select(outcome.ids());
    observer.on_articles_ready(&outcome.matches);
    if outcome.is_empty() {
        info!("No results");
        observer.on_no_results();
    } else {
        info!(matches = outcome.matches.len(), "Filter applied");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelObserver, Event, NullObserver};

    fn record(id: &str, title: &str, description: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            author: None,
            published_at: "2025-05-06T14:30:00Z".to_string(),
            url: format!("https://example.com/{id}"),
        }
    }

    async fn seeded(dir: &std::path::Path) -> LocalStore {
        let store = LocalStore::new(dir);
        store
            .write(
                &SourceKey::new("bbc-news", SortMode::Top),
                &[
                    record("b1", "Election results announced", Some("Polls closed at ten")),
                    record("b2", "Weather warning", None),
                ],
            )
            .await
            .unwrap();
        store
            .write(
                &SourceKey::new("cnn", SortMode::Top),
                &[record("c1", "Markets rally", Some("Election jitters fade"))],
            )
            .await
            .unwrap();
        store
    }

    fn sources() -> Vec<String> {
        vec!["bbc-news".to_string(), "cnn".to_string()]
    }

    #[test]
    fn test_validate_term() {
        assert!(validate_term("rally").is_ok());
        assert!(validate_term("~~a~~").is_ok());
        assert!(validate_term("?").is_ok());
        assert!(validate_term("~").is_err());
        assert!(validate_term("^").is_err());
        assert!(validate_term("").is_err());
        assert!(validate_term("   ").is_err());
    }

    #[test]
    fn test_match_in_title_and_description_counts_once() {
        let records = vec![record("x1", "Rally", Some("Rally again")), record("x2", "Calm", None)];
        let found = matching_records(&records, "Rally");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "x1");
    }

    #[tokio::test]
    async fn test_single_title_match_selects_one() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded(tmp.path()).await;
        let selection = Selection::default();
        selection.reset(vec!["b1".into(), "b2".into(), "c1".into()]);

        let outcome = filter_articles(
            &store,
            &sources(),
            SortMode::Top,
            "Weather",
            &selection,
            &NullObserver,
        )
        .await
        .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(selection.selected(), HashSet::from(["b2".to_string()]));
    }

    #[tokio::test]
    async fn test_matches_span_sources_and_are_case_sensitive() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded(tmp.path()).await;
        let selection = Selection::default();

        let outcome = filter_articles(
            &store,
            &sources(),
            SortMode::Top,
            "Election",
            &selection,
            &NullObserver,
        )
        .await
        .unwrap();
        assert_eq!(outcome.ids(), HashSet::from(["b1".to_string(), "c1".to_string()]));

        let outcome = filter_articles(
            &store,
            &sources(),
            SortMode::Top,
            "election",
            &selection,
            &NullObserver,
        )
        .await
        .unwrap();
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn test_no_results_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded(tmp.path()).await;
        let selection = Selection::default();
        selection.reset(vec!["b1".into()]);
        let (observer, mut rx) = ChannelObserver::new();

        let outcome = filter_articles(
            &store,
            &sources(),
            SortMode::Top,
            "volcano",
            &selection,
            &observer,
        )
        .await
        .unwrap();

        assert!(outcome.is_empty());
        assert!(selection.is_empty());
        assert_eq!(rx.try_recv().unwrap(), Event::ArticlesReady(vec![]));
        assert_eq!(rx.try_recv().unwrap(), Event::NoResults);
    }

    #[tokio::test]
    async fn test_invalid_term_leaves_selection_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let store = seeded(tmp.path()).await;
        let selection = Selection::default();
        selection.reset(vec!["b1".into(), "c1".into()]);
        let (observer, mut rx) = ChannelObserver::new();

        for term in ["~", "^", "~^~"] {
            let err = filter_articles(
                &store,
                &sources(),
                SortMode::Top,
                term,
                &selection,
                &observer,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, NewsError::Validation(_)));
        }
        assert_eq!(selection.len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_source_is_skipped_once() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        store
            .write(
                &SourceKey::new("cnn", SortMode::Top),
                &[record("c1", "Markets rally", None)],
            )
            .await
            .unwrap();

        let outcome = filter_articles(
            &store,
            &sources(),
            SortMode::Top,
            "rally",
            &Selection::default(),
            &NullObserver,
        )
        .await
        .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.skipped, vec![SourceKey::new("bbc-news", SortMode::Top)]);
    }
}

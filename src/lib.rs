//! # newsfeed
//!
//! Collects article listings from News API sources, keeps them as one JSON
//! collection per source and sort mode, filters them locally by keyword, and
//! saves the full pages of selected articles into dated archive directories.
//!
//! ## Pipeline
//!
//! 1. **Fetch**: request every configured source, normalize and store it
//! 2. **Refresh**: reload the store and select everything
//! 3. **Filter**: narrow the selection to records mentioning a term
//! 4. **Archive**: fetch and save each selected article's page
//!
//! Fetch and archive run in the background through a [`Session`], report
//! progress to an [`Observer`], and can be cancelled at any time.

pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod runner;
pub mod selection;
pub mod session;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{HttpPageFetcher, NewsApi, NewsApiClient, PageFetcher};
pub use config::Config;
pub use error::{NewsError, Result};
pub use events::{ChannelObserver, Event, NullObserver, Observer};
pub use models::{ArticleRecord, SortMode, SourceKey};
pub use runner::{OperationKind, RunState};
pub use session::Session;

//! In-process fakes of the remote traits, shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{NewsApi, PageFetcher};
use crate::error::{NewsError, Result};
use crate::models::{RawArticle, SortMode};

pub fn raw(title: &str, description: Option<&str>, url: &str) -> RawArticle {
    RawArticle {
        author: Some("Staff".to_string()),
        publishedAt: Some("2025-05-06T14:30:00Z".to_string()),
        title: Some(title.to_string()),
        description: description.map(str::to_string),
        url: Some(url.to_string()),
    }
}

/// Answers listings from a fixed map; unknown sources fail.
#[derive(Debug, Default)]
pub struct FakeNewsApi {
    listings: HashMap<String, Vec<RawArticle>>,
    offline: bool,
    pub calls: Mutex<Vec<(String, SortMode, String)>>,
}

impl FakeNewsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, source: &str, articles: Vec<RawArticle>) -> Self {
        self.listings.insert(source.to_string(), articles);
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, SortMode, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl NewsApi for FakeNewsApi {
    async fn check_connection(&self) -> Result<()> {
        if self.offline {
            return Err(NewsError::Connectivity {
                endpoint: "https://newsapi.org/".to_string(),
                reason: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_articles(
        &self,
        source: &str,
        sort_mode: SortMode,
        api_key: &str,
    ) -> Result<Vec<RawArticle>> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_string(), sort_mode, api_key.to_string()));
        self.listings
            .get(source)
            .cloned()
            .ok_or_else(|| NewsError::source_fetch(source, "404 Not Found"))
    }
}

/// Never answers a listing request; used to exercise cancellation.
#[derive(Debug, Default)]
pub struct StalledNewsApi;

impl NewsApi for StalledNewsApi {
    async fn check_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_articles(&self, _: &str, _: SortMode, _: &str) -> Result<Vec<RawArticle>> {
        std::future::pending().await
    }
}

/// Serves page bodies from a fixed map; unknown URLs fail.
#[derive(Debug, Default)]
pub struct FakePages {
    pages: HashMap<String, String>,
    offline: bool,
    pub requested: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl PageFetcher for FakePages {
    async fn check_connection(&self) -> Result<()> {
        if self.offline {
            return Err(NewsError::Connectivity {
                endpoint: "https://newsapi.org/".to_string(),
                reason: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| NewsError::source_fetch(url, "404 Not Found"))
    }
}

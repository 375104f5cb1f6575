//! Remote access: the News API client and the article page fetcher.
//!
//! Both sit behind small traits so the pipeline can be driven by in-process
//! fakes:
//! - [`NewsApi`]: one listing request per source, plus a reachability probe
//! - [`PageFetcher`]: raw page bodies for archiving
//!
//! [`NewsApiClient`] and [`HttpPageFetcher`] are the reqwest-backed
//! implementations. Neither retries: every request is a single best-effort
//! attempt and the caller decides what a failure means.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{NewsError, Result};
use crate::models::{ApiResponse, RawArticle, SortMode};
use crate::utils::truncate_for_log;

/// Root of the News API service, also used as the connectivity probe.
pub const NEWS_API_ROOT: &str = "https://newsapi.org/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of article listings.
pub trait NewsApi: Send + Sync {
    /// Succeeds when the API host answers at all.
    fn check_connection(&self) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the raw articles one source currently lists for `sort_mode`.
    fn fetch_articles(
        &self,
        source: &str,
        sort_mode: SortMode,
        api_key: &str,
    ) -> impl Future<Output = Result<Vec<RawArticle>>> + Send;
}

/// Source of full article pages.
pub trait PageFetcher: Send + Sync {
    fn check_connection(&self) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the page body at `url` exactly as served.
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("newsfeed/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

async fn probe(client: &Client, endpoint: &str) -> Result<()> {
    match client.get(endpoint).send().await {
        Ok(resp) => {
            debug!(%endpoint, status = %resp.status(), "Connected");
            Ok(())
        }
        Err(e) => Err(NewsError::Connectivity {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// reqwest-backed [`NewsApi`] talking to News API v2.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base: Url,
}

impl NewsApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base(NEWS_API_ROOT)
    }

    /// Point the client at another host, e.g. a local mirror.
    pub fn with_base(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| NewsError::Config(format!("bad API base '{base}': {e}")))?;
        Ok(Self {
            client: build_client()?,
            base,
        })
    }

    /// Listing URL for one source: `v2/top-headlines` or `v2/everything`.
    pub fn request_url(&self, source: &str, sort_mode: SortMode, api_key: &str) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("v2/{}", sort_mode.endpoint()))
            .map_err(|e| NewsError::source_fetch(source, e))?;
        url.query_pairs_mut()
            .append_pair("sources", source)
            .append_pair("apiKey", api_key);
        Ok(url)
    }
}

impl NewsApi for NewsApiClient {
    async fn check_connection(&self) -> Result<()> {
        probe(&self.client, self.base.as_str()).await
    }

    #[instrument(level = "info", skip(self, api_key), fields(%sort_mode))]
    async fn fetch_articles(
        &self,
        source: &str,
        sort_mode: SortMode,
        api_key: &str,
    ) -> Result<Vec<RawArticle>> {
        let t0 = Instant::now();
        let url = self.request_url(source, sort_mode, api_key)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::source_fetch(source, e))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| NewsError::source_fetch(source, e))?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "News API answered"
        );
        parse_listing(source, status, &body)
    }
}

/// Turn one listing response into raw articles.
///
/// A body without an `articles` array is a failure even on HTTP 200; an
/// empty array is a valid, empty listing.
pub fn parse_listing(source: &str, status: StatusCode, body: &str) -> Result<Vec<RawArticle>> {
    let parsed: ApiResponse = serde_json::from_str(body).map_err(|e| {
        warn!(
            source,
            %status,
            error = %e,
            body_preview = %truncate_for_log(body, 300),
            "News API returned non-conforming JSON"
        );
        NewsError::source_fetch(source, format!("malformed response ({status}): {e}"))
    })?;

    match parsed.articles {
        Some(articles) if status.is_success() => Ok(articles),
        _ => {
            let reason = match (parsed.code, parsed.message) {
                (Some(code), Some(message)) => format!("{status} {code}: {message}"),
                (None, Some(message)) => format!("{status}: {message}"),
                _ => format!("{status}: response had no articles"),
            };
            Err(NewsError::source_fetch(source, reason))
        }
    }
}

/// reqwest-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    probe_url: String,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            probe_url: NEWS_API_ROOT.to_string(),
        })
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn check_connection(&self) -> Result<()> {
        probe(&self.client, &self.probe_url).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

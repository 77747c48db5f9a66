//! DuckDuckGo link source - primary provider scraping the HTML endpoint.
//!
//! The [`DuckDuckGoSource`] queries `html.duckduckgo.com/html/` (the
//! no-JavaScript results page) and extracts result anchors. Target URLs
//! are wrapped in a `/l/?uddg=<encoded>` redirect which is decoded here.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::model::Candidate;

use super::http_client::build_search_http_client;
use super::{LinkSource, SourceError};

/// Default DuckDuckGo HTML endpoint base URL.
const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// Primary link source backed by the DuckDuckGo HTML results page.
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSource {
    /// Creates a new `DuckDuckGoSource` against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a `DuckDuckGoSource` with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if HTTP client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_search_http_client("duckduckgo")?,
            base_url: base_url.into(),
        })
    }
}

impl std::fmt::Debug for DuckDuckGoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDuckGoSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LinkSource for DuckDuckGoSource {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    #[tracing::instrument(skip(self, query), fields(provider = "duckduckgo"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError> {
        let response = self
            .client
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|error| SourceError::request_failed("duckduckgo", &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::unexpected_status("duckduckgo", status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|error| SourceError::request_failed("duckduckgo", &error))?;

        let candidates = parse_results(&body, max_results);
        debug!(count = candidates.len(), "Parsed DuckDuckGo results");
        Ok(candidates)
    }
}

/// Extracts result candidates from the HTML results page.
fn parse_results(body: &str, max_results: usize) -> Vec<Candidate> {
    #[allow(clippy::expect_used)]
    let anchor = Selector::parse("a.result__a").expect("static selector is valid");

    let document = Html::parse_document(body);
    document
        .select(&anchor)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = resolve_result_url(href)?;
            let title = element.text().collect::<String>().trim().to_string();
            Some(if title.is_empty() {
                Candidate::untitled(url)
            } else {
                Candidate::new(title, url)
            })
        })
        .take(max_results)
        .collect()
}

/// Unwraps the `uddg` redirect parameter, or accepts an absolute URL as-is.
fn resolve_result_url(href: &str) -> Option<String> {
    if let Some(position) = href.find("uddg=") {
        let encoded = href[position + "uddg=".len()..].split('&').next()?;
        let decoded = urlencoding::decode(encoded).ok()?;
        return Some(decoded.into_owned());
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

//! Google link source - secondary provider scraping the HTML results page.
//!
//! The [`GoogleSource`] is the fallback provider tried when the primary
//! yields nothing. Result targets are carried in `/url?q=<target>`
//! anchors on the no-JavaScript results page.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::model::Candidate;

use super::http_client::build_search_http_client;
use super::{LinkSource, SourceError};

/// Default Google search base URL.
const DEFAULT_BASE_URL: &str = "https://www.google.com";

/// Fallback link source backed by the Google HTML results page.
pub struct GoogleSource {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleSource {
    /// Creates a new `GoogleSource` against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a `GoogleSource` with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if HTTP client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_search_http_client("google")?,
            base_url: base_url.into(),
        })
    }
}

impl std::fmt::Debug for GoogleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LinkSource for GoogleSource {
    fn name(&self) -> &'static str {
        "google"
    }

    #[tracing::instrument(skip(self, query), fields(provider = "google"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError> {
        let num = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("num", num.as_str())])
            .send()
            .await
            .map_err(|error| SourceError::request_failed("google", &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::unexpected_status("google", status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|error| SourceError::request_failed("google", &error))?;

        let candidates = parse_results(&body, max_results);
        debug!(count = candidates.len(), "Parsed Google results");
        Ok(candidates)
    }
}

/// Extracts result candidates from `/url?q=` anchors.
fn parse_results(body: &str, max_results: usize) -> Vec<Candidate> {
    #[allow(clippy::expect_used)]
    let anchor = Selector::parse("a").expect("static selector is valid");
    #[allow(clippy::expect_used)]
    let heading = Selector::parse("h3").expect("static selector is valid");

    let document = Html::parse_document(body);
    document
        .select(&anchor)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            if !href.starts_with("/url?") {
                return None;
            }
            let url = extract_target(href)?;
            let title = element
                .select(&heading)
                .next()
                .map(|h3| h3.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty());
            Some(Candidate { title, url })
        })
        .take(max_results)
        .collect()
}

/// Pulls the decoded `q` parameter out of a `/url?q=<target>` href.
fn extract_target(href: &str) -> Option<String> {
    let base = Url::parse(DEFAULT_BASE_URL).ok()?;
    let resolved = base.join(href).ok()?;
    resolved
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .filter(|target| target.starts_with("http://") || target.starts_with("https://"))
}

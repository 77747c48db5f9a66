//! Page rendering capability for the deep audit tier.
//!
//! A [`RenderEngine`] turns a candidate URL into visible text and a page
//! title. The engine is the shared per-search resource (one browsing
//! profile, one connection pool); every `render` call is an isolated
//! page owned exclusively by one candidate task.
//!
//! The production engine is [`StaticRenderer`]: it fetches the document
//! itself and extracts text from the parsed DOM. Because it never
//! requests subresources, every block pattern is honored by
//! construction, and returning after the document body is its DOM-ready
//! wait. A full browser engine can be plugged in behind the same trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::user_agent;

/// Subresource patterns blocked during navigation to bound load latency:
/// image/media extensions plus tracking/ad resource markers.
pub const MEDIA_BLOCK_PATTERNS: &[&str] = &["png", "jpg", "jpeg", "gif", "mp4", "ad", "track"];

/// How long a render waits before considering the page loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Wait for the DOM only, not subresources. The audit default.
    DomContentLoaded,
    /// Wait for the full load event.
    FullLoad,
}

/// One page-render instruction.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// URL to navigate to.
    pub url: &'a str,
    /// Bound on the whole navigation, including body transfer.
    pub timeout: Duration,
    /// Subresource patterns to abort before navigation.
    pub block_patterns: &'a [&'a str],
    /// Load-completion condition.
    pub wait: WaitMode,
}

/// What a successful render yields.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Visible text of the document body (not raw HTML).
    pub visible_text: String,
    /// The document `<title>`, when present and non-empty.
    pub title: Option<String>,
}

/// Errors that can occur while rendering a candidate page.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The navigation could not complete (DNS, refused connection, transport).
    #[error("navigation to '{url}' failed: {reason}")]
    Navigation {
        /// The URL that failed to load.
        url: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The navigation exceeded its time bound.
    #[error("navigation to '{url}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// The bound that was exceeded, in milliseconds.
        timeout_ms: u128,
    },
}

impl RenderError {
    /// Creates a `Navigation` error.
    #[must_use]
    pub fn navigation(url: &str, reason: &str) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(url: &str, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis(),
        }
    }
}

/// Capability interface for rendering candidate pages.
///
/// # Object Safety
///
/// Uses `async_trait` so the auditor can hold `Arc<dyn RenderEngine>`
/// and tests can substitute stub engines.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Renders a page and extracts its visible text and title.
    async fn render(&self, request: RenderRequest<'_>) -> Result<RenderedPage, RenderError>;
}

/// Document-fetching render engine.
///
/// Holds the shared browsing profile: one cookie jar and one connection
/// pool reused by every page. No per-page state lives on the engine, so
/// concurrent renders never share mutable page state, and dropping the
/// engine releases the profile on every exit path.
pub struct StaticRenderer {
    client: Client,
}

impl Default for StaticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticRenderer {
    /// Creates a renderer with a fresh browsing profile.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(user_agent::BROWSER_USER_AGENT)
            .cookie_provider(Arc::new(Jar::default()))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

impl std::fmt::Debug for StaticRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticRenderer").finish_non_exhaustive()
    }
}

#[async_trait]
impl RenderEngine for StaticRenderer {
    #[tracing::instrument(skip(self, request), fields(url = %request.url))]
    async fn render(&self, request: RenderRequest<'_>) -> Result<RenderedPage, RenderError> {
        debug!(
            blocked_patterns = request.block_patterns.len(),
            wait = ?request.wait,
            "Navigating"
        );

        let url = request.url;
        let fetch = async {
            // Error pages still render: a 404 page has visible text for
            // the oracle to judge, so the status is not checked here.
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|error| RenderError::navigation(url, &error.to_string()))?;
            response
                .text()
                .await
                .map_err(|error| RenderError::navigation(url, &error.to_string()))
        };

        let body = tokio::time::timeout(request.timeout, fetch)
            .await
            .map_err(|_| RenderError::timeout(url, request.timeout))??;

        Ok(extract_page(&body))
    }
}

/// Parses a document into its visible body text and title.
fn extract_page(body: &str) -> RenderedPage {
    #[allow(clippy::expect_used)]
    let title_selector = Selector::parse("title").expect("static selector is valid");
    #[allow(clippy::expect_used)]
    let body_selector = Selector::parse("body").expect("static selector is valid");

    let document = Html::parse_document(body);

    let title = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    let visible_text = document
        .select(&body_selector)
        .next()
        .map(visible_text_of)
        .unwrap_or_default();

    RenderedPage {
        visible_text,
        title,
    }
}

/// Collects text nodes under an element, skipping non-visible containers.
fn visible_text_of(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|element| {
                matches!(
                    element.value().name(),
                    "script" | "style" | "noscript" | "template"
                )
            });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

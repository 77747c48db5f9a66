//! Search-engine link sources with ordered fallback.
//!
//! This module turns a [`SearchRequest`] into a list of candidate URLs by
//! querying web search providers behind one capability interface.
//!
//! # Architecture
//!
//! - [`LinkSource`] - Async trait that individual providers implement
//! - [`SourceChain`] - Ordered providers tried until one yields results
//! - [`DuckDuckGoSource`] - Primary provider (HTML endpoint scrape)
//! - [`GoogleSource`] - Fallback provider (HTML results scrape)
//! - [`build_query`] - Mode-specific query templates and site allowlists
//!
//! Provider failures are absorbed inside the chain: a failing or empty
//! provider is logged and the next one is tried, and an empty candidate
//! list is a valid (non-error) outcome propagated downstream.

mod duckduckgo;
mod error;
mod google;
mod http_client;
mod query;

pub use duckduckgo::DuckDuckGoSource;
pub use error::SourceError;
pub use google::GoogleSource;
pub use query::{FREE_REPOSITORIES, PAID_RETAILERS, build_query};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::model::{Candidate, SearchRequest};

/// Result limit requested from the primary provider.
pub const PRIMARY_MAX_RESULTS: usize = 10;

/// Result limit requested from the fallback provider.
pub const FALLBACK_MAX_RESULTS: usize = 8;

/// Capability interface for a web search provider.
///
/// Implementations must tolerate and surface empty results without
/// raising when no matches exist; the chain treats any raised error as
/// equivalent to empty results for fallback purposes.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn LinkSource>`. Rust 2024 native async traits are not
/// object-safe, so `async_trait` is required for the chain pattern.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the provider's name (e.g. "duckduckgo", "google").
    fn name(&self) -> &str;

    /// Runs one search and returns up to `max_results` candidates.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError>;
}

struct ChainEntry {
    source: Box<dyn LinkSource>,
    max_results: usize,
}

/// An ordered list of link sources tried until one yields candidates.
pub struct SourceChain {
    entries: Vec<ChainEntry>,
}

impl SourceChain {
    /// Creates an empty source chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a provider with its per-provider result limit.
    #[tracing::instrument(skip(self, source), fields(provider_name))]
    pub fn register(&mut self, source: Box<dyn LinkSource>, max_results: usize) {
        tracing::Span::current().record("provider_name", source.name());
        debug!(
            name = source.name(),
            max_results, "Registering link source"
        );
        self.entries.push(ChainEntry {
            source,
            max_results,
        });
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.entries.len()
    }

    /// Fetches candidates for a request.
    ///
    /// Builds the mode-specific query, then tries providers in
    /// registration order; the first non-empty result list wins.
    /// Provider errors and empty results fall through to the next
    /// provider. When every provider fails or comes back empty, an
    /// empty list is returned - never an error.
    #[tracing::instrument(skip(self, request), fields(mode = %request.mode))]
    pub async fn fetch_candidates(&self, request: &SearchRequest) -> Vec<Candidate> {
        let query = build_query(request);
        debug!(query = %query, "Built search query");

        for entry in &self.entries {
            match entry.source.search(&query, entry.max_results).await {
                Ok(candidates) => {
                    // Candidates without a URL never reach the verifiers.
                    let mut candidates = candidates;
                    candidates.retain(|candidate| !candidate.url.is_empty());
                    if candidates.is_empty() {
                        debug!(
                            provider = entry.source.name(),
                            "Provider returned no results; trying next"
                        );
                        continue;
                    }
                    debug!(
                        provider = entry.source.name(),
                        count = candidates.len(),
                        "Provider returned candidates"
                    );
                    return candidates;
                }
                Err(error) => {
                    warn!(
                        provider = entry.source.name(),
                        error = %error,
                        "Provider failed; trying next"
                    );
                }
            }
        }

        debug!("All providers failed or returned nothing");
        Vec::new()
    }
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|e| e.source.name()).collect();
        f.debug_struct("SourceChain")
            .field("source_count", &self.entries.len())
            .field("sources", &names)
            .finish()
    }
}

impl Default for SourceChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the default provider chain: DuckDuckGo first, Google fallback.
///
/// A provider whose client cannot be constructed is skipped with a
/// warning so the remaining providers still serve the request.
#[must_use]
pub fn build_default_source_chain() -> SourceChain {
    let mut chain = SourceChain::new();

    match DuckDuckGoSource::new() {
        Ok(source) => chain.register(Box::new(source), PRIMARY_MAX_RESULTS),
        Err(error) => warn!(
            error = %error,
            "DuckDuckGo source unavailable; continuing with remaining providers"
        ),
    }

    match GoogleSource::new() {
        Ok(source) => chain.register(Box::new(source), FALLBACK_MAX_RESULTS),
        Err(error) => warn!(
            error = %error,
            "Google source unavailable; continuing with remaining providers"
        ),
    }

    chain
}

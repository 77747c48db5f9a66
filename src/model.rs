//! Request and result types shared across the search pipeline.
//!
//! These types are request-scoped: a [`SearchRequest`] produces
//! [`Candidate`]s which produce at most one [`VerificationOutcome`] each,
//! and everything is discarded when the search call returns.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Maximum trust score an outcome can carry.
pub const MAX_TRUST_SCORE: u8 = 100;

/// Which site allowlist and query template a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Free repositories (archives, open libraries).
    Free,
    /// Commercial retailers with purchase-intent keywords.
    Paid,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown search mode '{other}' (expected 'free' or 'paid')")),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Immutable input for one search: what to look for and where.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Title of the file/book being searched for.
    pub filename: String,
    /// Expected file extension (e.g. "pdf", "epub"), lowercase.
    pub filetype: String,
    /// Which allowlist/template to use.
    pub mode: SearchMode,
}

impl SearchRequest {
    /// Creates a new search request. The filetype is normalized to lowercase.
    #[must_use]
    pub fn new(filename: impl Into<String>, filetype: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            filename: filename.into(),
            filetype: filetype.into().to_ascii_lowercase(),
            mode,
        }
    }
}

/// A search hit produced by a link source: a URL and an optional title.
///
/// The URL is the only required field; sources discard hits without one
/// during response parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Result title as reported by the search engine, when available.
    pub title: Option<String>,
    /// The candidate URL to verify.
    pub url: String,
}

impl Candidate {
    /// Creates a candidate with a title.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: url.into(),
        }
    }

    /// Creates a candidate with no title.
    #[must_use]
    pub fn untitled(url: impl Into<String>) -> Self {
        Self {
            title: None,
            url: url.into(),
        }
    }
}

/// A verified candidate, as returned over the request boundary.
///
/// Produced by either verifier tier; a candidate with no outcome is
/// simply dropped (there is no retained "rejected" record).
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    /// Display title for the result.
    pub title: String,
    /// The URL that was analyzed.
    pub source_url: String,
    /// Human-readable reason the candidate was accepted.
    pub snippet: String,
    /// Where to download/purchase from.
    pub download_link: String,
    /// Aggregate trust in this result, 0-100.
    pub trust_score: u8,
    /// Result kind: uppercased file extension for direct links, "WEB" for pages.
    #[serde(rename = "type")]
    pub link_type: String,
}

impl VerificationOutcome {
    /// Creates an outcome with the trust score clamped to [0, 100].
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        trust_score: u8,
        link_type: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            source_url: url.clone(),
            snippet: snippet.into(),
            download_link: url,
            trust_score: trust_score.min(MAX_TRUST_SCORE),
            link_type: link_type.into(),
        }
    }
}

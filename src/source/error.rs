//! Error types for link-source providers.

use thiserror::Error;

/// Errors a single link-source provider can raise.
///
/// The [`SourceChain`](super::SourceChain) absorbs these: a failing
/// provider is logged and the next provider in the chain is tried, so
/// these errors never cross the request boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The search request could not be sent or timed out.
    #[error("search request to '{provider}' failed: {reason}")]
    RequestFailed {
        /// Provider name (e.g. "duckduckgo").
        provider: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("'{provider}' returned HTTP {status}")]
    UnexpectedStatus {
        /// Provider name.
        provider: String,
        /// HTTP status code received.
        status: u16,
    },

    /// The result page could not be parsed into candidates.
    #[error("could not parse '{provider}' results: {reason}")]
    Parse {
        /// Provider name.
        provider: String,
        /// What went wrong during extraction.
        reason: String,
    },
}

impl SourceError {
    /// Creates a `RequestFailed` error from a transport error.
    #[must_use]
    pub fn request_failed(provider: &str, error: &reqwest::Error) -> Self {
        Self::RequestFailed {
            provider: provider.to_string(),
            reason: error.to_string(),
        }
    }

    /// Creates an `UnexpectedStatus` error.
    #[must_use]
    pub fn unexpected_status(provider: &str, status: u16) -> Self {
        Self::UnexpectedStatus {
            provider: provider.to_string(),
            status,
        }
    }

    /// Creates a `Parse` error.
    #[must_use]
    pub fn parse(provider: &str, reason: &str) -> Self {
        Self::Parse {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message() {
        let err = SourceError::unexpected_status("duckduckgo", 429);
        let msg = err.to_string();
        assert!(msg.contains("duckduckgo"), "should contain provider");
        assert!(msg.contains("429"), "should contain status");
    }

    #[test]
    fn test_parse_message() {
        let err = SourceError::parse("google", "no result anchors");
        assert!(err.to_string().contains("no result anchors"));
    }
}

//! Shared HTTP client construction policy for link sources.
//!
//! Centralizes search networking defaults so providers stay consistent
//! on timeout, user-agent, and compression.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent;

use super::SourceError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 20;

/// Builds a search-provider HTTP client using shared project policy.
///
/// Providers send the browser User-Agent: search result pages gate on
/// bot detection and reject tool-identifying agents outright.
///
/// # Errors
///
/// Returns [`SourceError`] when client construction fails.
pub(crate) fn build_search_http_client(provider: &str) -> Result<Client, SourceError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(user_agent::BROWSER_USER_AGENT)
        .gzip(true)
        .build()
        .map_err(|error| SourceError::RequestFailed {
            provider: provider.to_string(),
            reason: format!("HTTP client construction failed: {error}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_http_client_succeeds_with_static_config() {
        assert!(build_search_http_client("duckduckgo").is_ok());
    }
}

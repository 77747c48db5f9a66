//! Header-only fast verification of candidate URLs.
//!
//! The [`HeadProbe`] issues a metadata-only HEAD request against a
//! candidate and classifies it as a direct file link (or not) from the
//! `content-type` and `content-disposition` response headers alone. It
//! never fetches a response body, making it cheap enough to run against
//! every candidate before committing to a full page render.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tracing::debug;

use crate::user_agent;

/// Score reported when headers prove a direct file link.
pub const DIRECT_MATCH_SCORE: u8 = 100;

/// Total timeout for one metadata probe.
const PROBE_TIMEOUT_SECS: u64 = 4;

/// Verdict of one metadata probe.
///
/// Probes are infallible at this boundary: transport errors, timeouts,
/// and non-matching headers all collapse to a zero score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeVerdict {
    /// 100 for a proven direct file link, 0 otherwise.
    pub score: u8,
    /// Why the link was accepted, when it was.
    pub reason: Option<&'static str>,
}

impl ProbeVerdict {
    /// True when the probe proved a direct file link.
    #[must_use]
    pub fn is_direct_hit(self) -> bool {
        self.score == DIRECT_MATCH_SCORE
    }

    fn miss() -> Self {
        Self {
            score: 0,
            reason: None,
        }
    }

    fn hit(reason: &'static str) -> Self {
        Self {
            score: DIRECT_MATCH_SCORE,
            reason: Some(reason),
        }
    }
}

/// Metadata prober for candidate URLs.
///
/// The probe client follows redirects and accepts invalid TLS
/// certificates: candidates live on arbitrary third-party hosts with
/// broken certificate chains, and reachability wins over transport
/// authenticity for a header-only check that downloads nothing. The
/// MITM exposure is confined to the two headers this module reads.
#[derive(Debug, Clone)]
pub struct HeadProbe {
    client: Client,
}

impl Default for HeadProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadProbe {
    /// Creates a probe with the default 4-second timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
    }

    /// Creates a probe with an explicit timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the
    /// supplied timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent::default_probe_user_agent())
            .danger_accept_invalid_certs(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Probes a candidate URL for direct-file signatures.
    ///
    /// Returns [`DIRECT_MATCH_SCORE`] when either header proves a file:
    /// - `content-type` containing the expected filetype token or the
    ///   generic `application/pdf` marker ("Direct File Link")
    /// - `content-disposition` naming the expected extension or marked
    ///   `attachment` ("Direct Download")
    ///
    /// Any other outcome, including transport or timeout failure,
    /// returns a zero score - this method never raises.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn probe(&self, url: &str, expected_filetype: &str) -> ProbeVerdict {
        let response = match self.client.head(url).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(error = %error, "Metadata probe failed");
                return ProbeVerdict::miss();
            }
        };

        let expected = expected_filetype.to_ascii_lowercase();
        let content_type = header_value(&response, CONTENT_TYPE);
        let content_disposition = header_value(&response, CONTENT_DISPOSITION);

        if content_type.contains(&expected) || content_type.contains("application/pdf") {
            debug!(content_type = %content_type, "Direct file content-type");
            return ProbeVerdict::hit("Direct File Link");
        }

        if content_disposition.contains(&format!(".{expected}"))
            || content_disposition.contains("attachment")
        {
            debug!(content_disposition = %content_disposition, "Download disposition");
            return ProbeVerdict::hit("Direct Download");
        }

        ProbeVerdict::miss()
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_verdict_direct_hit_detection() {
        assert!(ProbeVerdict::hit("Direct File Link").is_direct_hit());
        assert!(!ProbeVerdict::miss().is_direct_hit());
    }

    #[tokio::test]
    async fn test_probe_matching_content_type_is_direct_file_link() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/dune.pdf"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "application/pdf"),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/dune.pdf", server.uri()), "pdf").await;

        assert_eq!(verdict.score, DIRECT_MATCH_SCORE);
        assert_eq!(verdict.reason, Some("Direct File Link"));
    }

    #[tokio::test]
    async fn test_probe_filetype_token_in_content_type_matches() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/book"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "application/epub+zip"),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/book", server.uri()), "epub").await;

        assert!(verdict.is_direct_hit());
    }

    #[tokio::test]
    async fn test_probe_attachment_disposition_is_direct_download() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .insert_header("content-disposition", "attachment; filename=\"dune.bin\""),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/get", server.uri()), "pdf").await;

        assert_eq!(verdict.score, DIRECT_MATCH_SCORE);
        assert_eq!(verdict.reason, Some("Direct Download"));
    }

    #[tokio::test]
    async fn test_probe_extension_in_disposition_is_direct_download() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .insert_header("content-disposition", "inline; filename=\"dune.epub\""),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/get", server.uri()), "epub").await;

        assert!(verdict.is_direct_hit());
    }

    #[tokio::test]
    async fn test_probe_html_page_scores_zero() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/article", server.uri()), "pdf").await;

        assert_eq!(verdict, ProbeVerdict::miss());
    }

    #[tokio::test]
    async fn test_probe_transport_failure_scores_zero() {
        // Port 9 (discard) refuses connections in test environments.
        let probe = HeadProbe::with_timeout(Duration::from_millis(500));
        let verdict = probe.probe("http://127.0.0.1:9/missing.pdf", "pdf").await;

        assert_eq!(verdict, ProbeVerdict::miss());
    }

    #[tokio::test]
    async fn test_probe_timeout_scores_zero() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::with_timeout(Duration::from_millis(200));
        let verdict = probe.probe(&format!("{}/slow", server.uri()), "pdf").await;

        assert_eq!(verdict, ProbeVerdict::miss());
    }

    #[tokio::test]
    async fn test_probe_follows_redirects_to_file() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/moved"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/dune.pdf", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/dune.pdf"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "application/pdf"),
            )
            .mount(&server)
            .await;

        let probe = HeadProbe::new();
        let verdict = probe.probe(&format!("{}/moved", server.uri()), "pdf").await;

        assert!(verdict.is_direct_hit());
    }
}

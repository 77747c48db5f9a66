//! Content classification capability for the deep audit tier.
//!
//! A [`ContentOracle`] judges whether a rendered page is a legitimate
//! place to buy or download the searched file. The production oracle is
//! [`GeminiOracle`], a client for the Gemini `generateContent` REST API
//! configured from the `GEMINI_API_KEY` environment variable by the
//! setup layer.
//!
//! Oracle failures are a trust decision, not a crash: the
//! [`FallbackPolicy`] chosen by the caller decides whether an
//! unavailable oracle accepts candidates at a moderate confidence
//! (fail open) or drops them (fail closed).

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for page audits.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Total timeout for one classification call.
const ORACLE_TIMEOUT_SECS: u64 = 30;

/// Confidence assigned to fail-open verdicts when the oracle was never
/// configured (no key, no call attempted).
pub const UNCONFIGURED_CONFIDENCE: u8 = 50;

/// Confidence assigned to fail-open verdicts when a classification call
/// was attempted but failed in transport or parsing.
pub const DEGRADED_CONFIDENCE: u8 = 60;

/// What to do with a candidate when the oracle cannot answer.
///
/// Fail-open trades precision for availability: unverifiable pages are
/// surfaced at moderate confidence instead of being dropped, which is a
/// plausible source of false positives and is therefore configurable
/// rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Accept the candidate with a fixed moderate confidence.
    #[default]
    FailOpen,
    /// Drop the candidate.
    FailClosed,
}

/// Oracle answer for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Accept or reject.
    pub status: VerdictStatus,
    /// How sure the oracle is, 0-100.
    pub confidence: u8,
    /// Short human-readable justification (at most ~10 words).
    pub reason: String,
}

/// Accept/reject classification of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    /// Legitimate page to buy or download the file.
    Accepted,
    /// Spam, malware, parked domain, or irrelevant page.
    Rejected,
}

/// Errors that can occur during content classification.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// No API key is configured; no call was attempted.
    #[error("content oracle is not configured (missing API key)")]
    Unconfigured,

    /// The classification request could not complete.
    #[error("content oracle call failed: {reason}")]
    Transport {
        /// Transport-level failure description.
        reason: String,
    },

    /// The oracle answered with something that is not a verdict.
    #[error("content oracle returned unparsable output: {reason}")]
    Malformed {
        /// What failed to parse.
        reason: String,
    },
}

impl OracleError {
    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(reason: &str) -> Self {
        Self::Transport {
            reason: reason.to_string(),
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(reason: &str) -> Self {
        Self::Malformed {
            reason: reason.to_string(),
        }
    }
}

/// Capability interface for page content classification.
///
/// # Object Safety
///
/// Uses `async_trait` so the auditor can hold `Arc<dyn ContentOracle>`
/// and tests can substitute scripted oracles.
#[async_trait]
pub trait ContentOracle: Send + Sync {
    /// Classifies a page from its URL and visible-text snippet.
    async fn classify(&self, url: &str, text: &str) -> Result<Verdict, OracleError>;
}

// ==================== Gemini wire types ====================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

// ==================== GeminiOracle ====================

/// Gemini-backed content oracle.
///
/// Constructed with an optional API key; without one, every `classify`
/// call returns [`OracleError::Unconfigured`] and the caller's
/// [`FallbackPolicy`] decides the candidate's fate.
pub struct GeminiOracle {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiOracle {
    /// Creates an oracle with the given API key (or none).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates an oracle configured from the `GEMINI_API_KEY` environment
    /// variable. A missing or empty variable leaves it unconfigured.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self::new(api_key)
    }

    /// Creates an oracle with a custom base URL (for testing with wiremock).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(ORACLE_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// True when an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for GeminiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key itself.
        f.debug_struct("GeminiOracle")
            .field("configured", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentOracle for GeminiOracle {
    #[tracing::instrument(skip(self, text), fields(url = %url))]
    async fn classify(&self, url: &str, text: &str) -> Result<Verdict, OracleError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(OracleError::Unconfigured);
        };

        let prompt = audit_prompt(url, text);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|error| OracleError::transport(&error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::transport(&format!("HTTP {}", status.as_u16())));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|error| OracleError::malformed(&error.to_string()))?;

        let answer = parsed
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| OracleError::malformed("response missing text content"))?;

        let verdict = parse_verdict(&answer)?;
        debug!(status = ?verdict.status, confidence = verdict.confidence, "Oracle verdict");
        Ok(verdict)
    }
}

/// Builds the audit prompt sent to the model.
fn audit_prompt(url: &str, text: &str) -> String {
    format!(
        "You are auditing a search result for a user looking for a specific book/file.\n\
         URL: {url}\n\
         Page Content Snippet: {text}\n\
         \n\
         Task:\n\
         1. Is this a LEGITIMATE page where the user can buy or download the book? (ACCEPTED)\n\
         2. Is it spam, malware, a parked domain, or an irrelevant blog? (REJECTED)\n\
         \n\
         Return JSON ONLY:\n\
         {{\n\
             \"status\": \"ACCEPTED\" or \"REJECTED\",\n\
             \"confidence\": 0-100,\n\
             \"reason\": \"Why you think so (max 10 words)\"\n\
         }}"
    )
}

/// Parses a model answer into a verdict, tolerating Markdown code fences.
fn parse_verdict(answer: &str) -> Result<Verdict, OracleError> {
    let cleaned = strip_code_fences(answer);
    serde_json::from_str(&cleaned).map_err(|error| OracleError::malformed(&error.to_string()))
}

/// Strips the ```json fences models wrap around JSON payloads.
fn strip_code_fences(raw: &str) -> String {
    #[allow(clippy::expect_used)]
    static FENCE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"```(?:json)?").expect("static fence pattern is valid"));
    FENCE.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gemini_answer(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[test]
    fn test_parse_verdict_plain_json() {
        let verdict = parse_verdict(
            r#"{"status": "ACCEPTED", "confidence": 85, "reason": "Official retailer page"}"#,
        )
        .unwrap();
        assert_eq!(verdict.status, VerdictStatus::Accepted);
        assert_eq!(verdict.confidence, 85);
    }

    #[test]
    fn test_parse_verdict_strips_code_fences() {
        let fenced = "```json\n{\"status\": \"REJECTED\", \"confidence\": 90, \"reason\": \"Parked domain\"}\n```";
        let verdict = parse_verdict(fenced).unwrap();
        assert_eq!(verdict.status, VerdictStatus::Rejected);
        assert_eq!(verdict.reason, "Parked domain");
    }

    #[test]
    fn test_parse_verdict_rejects_prose() {
        let error = parse_verdict("I think this page looks fine.").unwrap_err();
        assert!(matches!(error, OracleError::Malformed { .. }), "got: {error}");
    }

    #[test]
    fn test_verdict_status_wire_form_is_uppercase() {
        assert_eq!(
            serde_json::to_string(&VerdictStatus::Accepted).unwrap(),
            "\"ACCEPTED\""
        );
    }

    #[test]
    fn test_unconfigured_oracle_reports_unconfigured() {
        let oracle = GeminiOracle::new(None);
        assert!(!oracle.is_configured());

        let error = tokio_test::block_on(oracle.classify("https://x.test", "text")).unwrap_err();
        assert!(matches!(error, OracleError::Unconfigured), "got: {error}");
    }

    #[test]
    fn test_oracle_debug_never_prints_key() {
        let oracle = GeminiOracle::new(Some("secret-key-value".to_string()));
        let debug_str = format!("{oracle:?}");
        assert!(!debug_str.contains("secret-key-value"));
        assert!(debug_str.contains("configured: true"));
    }

    #[tokio::test]
    async fn test_classify_parses_accepted_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(
                r#"{"status": "ACCEPTED", "confidence": 92, "reason": "Publisher product page"}"#,
            )))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_base_url(Some("test-key".to_string()), server.uri());
        let verdict = oracle
            .classify("https://springer.com/dune", "Buy Dune hardcover")
            .await
            .unwrap();

        assert_eq!(verdict.status, VerdictStatus::Accepted);
        assert_eq!(verdict.confidence, 92);
        assert_eq!(verdict.reason, "Publisher product page");
    }

    #[tokio::test]
    async fn test_classify_sends_url_and_snippet_in_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(body_string_contains("https://springer.com/dune"))
            .and(body_string_contains("Buy Dune hardcover"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(
                r#"{"status": "ACCEPTED", "confidence": 70, "reason": "ok"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_base_url(Some("test-key".to_string()), server.uri());
        let verdict = oracle
            .classify("https://springer.com/dune", "Buy Dune hardcover")
            .await
            .unwrap();
        assert_eq!(verdict.confidence, 70);
    }

    #[tokio::test]
    async fn test_classify_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_base_url(Some("test-key".to_string()), server.uri());
        let error = oracle.classify("https://x.test", "text").await.unwrap_err();
        assert!(matches!(error, OracleError::Transport { .. }), "got: {error}");
    }

    #[tokio::test]
    async fn test_classify_empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_base_url(Some("test-key".to_string()), server.uri());
        let error = oracle.classify("https://x.test", "text").await.unwrap_err();
        assert!(matches!(error, OracleError::Malformed { .. }), "got: {error}");
    }

    #[tokio::test]
    async fn test_classify_prose_answer_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_answer("Looks like a normal page to me.")),
            )
            .mount(&server)
            .await;

        let oracle = GeminiOracle::with_base_url(Some("test-key".to_string()), server.uri());
        let error = oracle.classify("https://x.test", "text").await.unwrap_err();
        assert!(matches!(error, OracleError::Malformed { .. }), "got: {error}");
    }
}

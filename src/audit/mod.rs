//! Deep audit of ambiguous candidate pages.
//!
//! Candidates that the fast header probe cannot prove to be direct file
//! links get the slow treatment: render the page through the shared
//! [`RenderEngine`](render::RenderEngine), extract its visible text, and
//! ask the [`ContentOracle`](oracle::ContentOracle) whether the page is
//! a legitimate place to obtain the file.
//!
//! Every failure mode short of an explicit oracle answer is local: a
//! page that cannot be rendered is silently dropped, and an oracle that
//! cannot answer is resolved by the configured
//! [`FallbackPolicy`](oracle::FallbackPolicy).

pub mod oracle;
pub mod render;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::model::{Candidate, VerificationOutcome};

use oracle::{
    ContentOracle, DEGRADED_CONFIDENCE, FallbackPolicy, OracleError, UNCONFIGURED_CONFIDENCE,
    Verdict, VerdictStatus,
};
use render::{MEDIA_BLOCK_PATTERNS, RenderEngine, RenderRequest, WaitMode};

/// Bound on one page navigation.
const NAVIGATION_TIMEOUT_SECS: u64 = 9;

/// Bound on the visible-text snippet handed to the oracle.
const TEXT_SNIPPET_LIMIT: usize = 4000;

/// Result kind tag for audited pages.
const PAGE_LINK_TYPE: &str = "WEB";

/// Renders ambiguous candidates and classifies their content.
///
/// Holds the shared render engine and oracle; each `audit` call owns its
/// page exclusively, so auditors can serve any number of concurrent
/// candidate tasks.
pub struct DeepAuditor {
    engine: Arc<dyn RenderEngine>,
    oracle: Arc<dyn ContentOracle>,
    fallback: FallbackPolicy,
    navigation_timeout: Duration,
}

impl DeepAuditor {
    /// Creates an auditor over a render engine and oracle.
    #[must_use]
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        oracle: Arc<dyn ContentOracle>,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            engine,
            oracle,
            fallback,
            navigation_timeout: Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
        }
    }

    /// Overrides the navigation timeout (used by tests).
    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Audits one candidate page.
    ///
    /// Returns `None` when the page cannot be rendered, when the oracle
    /// rejects it, or when the oracle cannot answer under a fail-closed
    /// policy. Returns an outcome with the oracle's confidence as the
    /// trust score otherwise.
    #[tracing::instrument(
        skip(self, candidate),
        fields(url = %candidate.url, filetype = %expected_filetype)
    )]
    pub async fn audit(
        &self,
        candidate: &Candidate,
        expected_filetype: &str,
    ) -> Option<VerificationOutcome> {
        let request = RenderRequest {
            url: &candidate.url,
            timeout: self.navigation_timeout,
            block_patterns: MEDIA_BLOCK_PATTERNS,
            wait: WaitMode::DomContentLoaded,
        };

        let page = match self.engine.render(request).await {
            Ok(page) => page,
            Err(error) => {
                debug!(error = %error, "Candidate page failed to render; dropping");
                return None;
            }
        };

        let snippet = truncate_chars(&page.visible_text, TEXT_SNIPPET_LIMIT);
        let verdict = match self.oracle.classify(&candidate.url, snippet).await {
            Ok(verdict) => verdict,
            Err(error) => self.fallback_verdict(&error)?,
        };

        match verdict.status {
            VerdictStatus::Accepted => {
                let title = candidate
                    .title
                    .clone()
                    .or(page.title)
                    .unwrap_or_else(|| candidate.url.clone());
                Some(VerificationOutcome::new(
                    title,
                    &candidate.url,
                    verdict.reason,
                    verdict.confidence,
                    PAGE_LINK_TYPE,
                ))
            }
            VerdictStatus::Rejected => {
                debug!(reason = %verdict.reason, "Oracle rejected candidate");
                None
            }
        }
    }

    /// Resolves an oracle failure according to the fallback policy.
    fn fallback_verdict(&self, error: &OracleError) -> Option<Verdict> {
        match self.fallback {
            FallbackPolicy::FailClosed => {
                warn!(error = %error, "Oracle unavailable; dropping candidate (fail closed)");
                None
            }
            FallbackPolicy::FailOpen => {
                warn!(error = %error, "Oracle unavailable; accepting at reduced confidence");
                let verdict = match error {
                    OracleError::Unconfigured => Verdict {
                        status: VerdictStatus::Accepted,
                        confidence: UNCONFIGURED_CONFIDENCE,
                        reason: "Content check unavailable, basic checks passed".to_string(),
                    },
                    OracleError::Transport { .. } | OracleError::Malformed { .. } => Verdict {
                        status: VerdictStatus::Accepted,
                        confidence: DEGRADED_CONFIDENCE,
                        reason: "Content check skipped".to_string(),
                    },
                };
                Some(verdict)
            }
        }
    }
}

impl std::fmt::Debug for DeepAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepAuditor")
            .field("fallback", &self.fallback)
            .field("navigation_timeout", &self.navigation_timeout)
            .finish_non_exhaustive()
    }
}

/// Truncates to at most `limit` characters on a char boundary.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
